//! Route long-name lookup for feeds that omit `route_long_name`.

use std::collections::HashMap;

/// Long names keyed by route short name.
///
/// Numeric short names are matched by value ("01" finds "1"); other short
/// names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct LongNameTable {
    names: HashMap<String, String>,
}

impl LongNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, short_name: &str, long_name: &str) {
        self.names.insert(key(short_name), long_name.to_string());
    }

    pub fn get(&self, short_name: &str) -> Option<&str> {
        self.names.get(&key(short_name)).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for LongNameTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut table = LongNameTable::new();
        for (short, long) in iter {
            table.add(short, long);
        }
        table
    }
}

fn key(short_name: &str) -> String {
    let short_name = short_name.trim();
    if !short_name.is_empty() && short_name.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = short_name.parse::<u64>() {
            return n.to_string();
        }
    }
    short_name.to_uppercase()
}
