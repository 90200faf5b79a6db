use std::collections::BTreeMap;
use stockid::{Guid, SchemaFragment, Validated, define_validated_enum};

define_validated_enum!(
    /// Whether a cabinet accepts new items. A cabinet whose current count
    /// reaches its capacity is stored as `FULL_LOAD` whatever was requested.
    pub enum CabinetStatus {
        Disabled = 0 => "DISABLED",
        Enabled = 1 => "ENABLED",
        FullLoad = 2 => "FULL_LOAD",
    }
);

define_validated_enum!(
    /// Whether a storage rule is enforced.
    pub enum RuleStatus {
        Disabled = 0 => "DISABLED",
        Enabled = 1 => "ENABLED",
    }
);

define_validated_enum!(
    /// How a storage rule treats the locations listed in its records.
    pub enum RuleType {
        /// Nothing may be stored anywhere.
        AllForbid = 0 => "ALL_FORBID",
        /// Listed locations are forbidden.
        BlackList = 1 => "BLACK_LIST",
        /// Only listed locations are allowed.
        WhiteList = 2 => "WHITE_LIST",
    }
);

define_validated_enum!(
    /// The kind of record a storage location identifier refers to.
    pub enum StorageLocationType {
        Room = 0 => "ROOM",
        Cabinet = 1 => "CABINET",
    }
);

define_validated_enum!(
    /// How a setting's stored text is interpreted.
    pub enum SettingValueType {
        String = 0 => "STRING",
        Integer = 1 => "INTEGER",
        Float = 2 => "FLOAT",
        Boolean = 3 => "BOOLEAN",
    }
);

fn entry<T: Validated>() -> (&'static str, SchemaFragment) {
    (T::TYPE_NAME, T::schema())
}

/// Documentation fragments of every validated type, keyed by type name.
pub fn schemas() -> BTreeMap<&'static str, SchemaFragment> {
    BTreeMap::from([
        entry::<Guid>(),
        entry::<CabinetStatus>(),
        entry::<RuleStatus>(),
        entry::<RuleType>(),
        entry::<StorageLocationType>(),
        entry::<SettingValueType>(),
    ])
}
