use crate::Guid;
use core::fmt;

struct FieldLayout {
    name: &'static str,
    bits: u64,
    value: u64,
}

impl Guid {
    fn fields(&self) -> [FieldLayout; 5] {
        [
            FieldLayout {
                name: "sign",
                bits: 1,
                value: self.to_raw() >> 63,
            },
            FieldLayout {
                name: "timestamp",
                bits: Self::TIMESTAMP_BITS,
                value: self.timestamp(),
            },
            FieldLayout {
                name: "datacenter",
                bits: Self::DATACENTER_BITS,
                value: self.datacenter_index(),
            },
            FieldLayout {
                name: "worker",
                bits: Self::WORKER_BITS,
                value: self.worker_index(),
            },
            FieldLayout {
                name: "sequence",
                bits: Self::SEQUENCE_BITS,
                value: self.sequence_index(),
            },
        ]
    }
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let len = s.len();
    if len >= width {
        return s;
    }
    let pad = width - len;
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

fn border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
    write!(f, "        +")?;
    for &w in columns {
        write!(f, "{}+", "-".repeat(w))?;
    }
    writeln!(f)
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(f, "Guid({})", self.to_raw());
        }

        let fields = self.fields();

        // Compute max width per column: label, dec, hex
        let columns: Vec<usize> = fields
            .iter()
            .map(|field| {
                let label_len = format!("{} ({})", field.name, field.bits).len();
                let dec_len = field.value.to_string().len();
                let hex_len = format!("0x{:x}", field.value).len();
                label_len.max(dec_len).max(hex_len) + 2
            })
            .collect();

        writeln!(f, "Guid {{")?;
        writeln!(
            f,
            "    raw id     : 0x{:016x} ({})",
            self.to_raw(),
            self.to_raw()
        )?;
        writeln!(f, "    valid      : {}", self.is_valid())?;
        writeln!(f, "    created    : {}", self.created_at_formatted())?;
        writeln!(f, "    layout     :")?;

        border(f, &columns)?;
        write!(f, "        |")?;
        for (field, &w) in fields.iter().zip(&columns) {
            write!(f, "{}|", center(format!("{} ({})", field.name, field.bits), w))?;
        }
        writeln!(f)?;
        border(f, &columns)?;

        write!(f, "        |")?;
        for (field, &w) in fields.iter().zip(&columns) {
            write!(f, "{}|", center(field.value, w))?;
        }
        writeln!(f)?;

        write!(f, "        |")?;
        for (field, &w) in fields.iter().zip(&columns) {
            write!(f, "{}|", center(format!("0x{:x}", field.value), w))?;
        }
        writeln!(f)?;
        border(f, &columns)?;

        write!(f, "}}")
    }
}
