//! Datatype and cardinality codes
//!
//! Datatypes are compared by code equality only. `VA` and `LVA` are
//! different types even though both hold text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// Conceptual datatype code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Integer,
    ShortInteger,
    LongInteger,
    Byte,
    Number,
    Decimal,
    Float,
    ShortFloat,
    LongFloat,
    Money,
    Serial,
    Boolean,
    Characters,
    VarChar,
    LongCharacters,
    LongVarChar,
    Text,
    Multibyte,
    VariableMultibyte,
    Date,
    Time,
    DateTime,
    Timestamp,
    Binary,
    LongBinary,
    Bitmap,
    Image,
    OleObject,
    /// No datatype assigned
    Undefined,
}

impl DataType {
    /// Short code as written in schema documents
    pub fn code(&self) -> &'static str {
        match self {
            Self::Integer => "I",
            Self::ShortInteger => "SI",
            Self::LongInteger => "LI",
            Self::Byte => "BT",
            Self::Number => "N",
            Self::Decimal => "DC",
            Self::Float => "F",
            Self::ShortFloat => "SF",
            Self::LongFloat => "LF",
            Self::Money => "MN",
            Self::Serial => "NO",
            Self::Boolean => "BL",
            Self::Characters => "A",
            Self::VarChar => "VA",
            Self::LongCharacters => "LA",
            Self::LongVarChar => "LVA",
            Self::Text => "TXT",
            Self::Multibyte => "MBT",
            Self::VariableMultibyte => "VMBT",
            Self::Date => "D",
            Self::Time => "T",
            Self::DateTime => "DT",
            Self::Timestamp => "TS",
            Self::Binary => "BIN",
            Self::LongBinary => "LBIN",
            Self::Bitmap => "BMP",
            Self::Image => "PIC",
            Self::OleObject => "OLE",
            Self::Undefined => "",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::ShortInteger => "Short Integer",
            Self::LongInteger => "Long Integer",
            Self::Byte => "Byte",
            Self::Number => "Number",
            Self::Decimal => "Decimal",
            Self::Float => "Float",
            Self::ShortFloat => "Short Float",
            Self::LongFloat => "Long Float",
            Self::Money => "Money",
            Self::Serial => "Serial",
            Self::Boolean => "Boolean",
            Self::Characters => "Characters",
            Self::VarChar => "VARCHAR",
            Self::LongCharacters => "Long Characters",
            Self::LongVarChar => "Long VARCHAR",
            Self::Text => "Text",
            Self::Multibyte => "Multibyte",
            Self::VariableMultibyte => "Variable Multibyte",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "Date and Time",
            Self::Timestamp => "Timestamp",
            Self::Binary => "Binary",
            Self::LongBinary => "Long Binary",
            Self::Bitmap => "Bitmap",
            Self::Image => "Image",
            Self::OleObject => "OLE Object",
            Self::Undefined => "Undefined",
        }
    }

    /// Parse a raw vendor datatype such as `VA50` or `DC10,2`
    ///
    /// Embedded length and precision are dropped; they are carried in
    /// separate fields.
    pub fn from_raw(raw: &str) -> Result<Self, UnknownDataType> {
        static EMBEDDED_SIZE: OnceLock<Regex> = OnceLock::new();
        let re = EMBEDDED_SIZE.get_or_init(|| Regex::new(r"[0-9,]").expect("valid regex"));

        re.replace_all(raw.trim(), "").parse()
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error for a datatype code outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown datatype code '{0}'")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let datatype = match code.to_uppercase().as_str() {
            "I" => Self::Integer,
            "SI" => Self::ShortInteger,
            "LI" => Self::LongInteger,
            "BT" => Self::Byte,
            "N" => Self::Number,
            "DC" => Self::Decimal,
            "F" => Self::Float,
            "SF" => Self::ShortFloat,
            "LF" => Self::LongFloat,
            "MN" => Self::Money,
            "NO" => Self::Serial,
            "BL" => Self::Boolean,
            "A" => Self::Characters,
            "VA" => Self::VarChar,
            "LA" => Self::LongCharacters,
            "LVA" => Self::LongVarChar,
            "TXT" => Self::Text,
            "MBT" => Self::Multibyte,
            "VMBT" => Self::VariableMultibyte,
            "D" => Self::Date,
            "T" => Self::Time,
            "DT" => Self::DateTime,
            "TS" => Self::Timestamp,
            "BIN" => Self::Binary,
            "LBIN" => Self::LongBinary,
            "BMP" => Self::Bitmap,
            "PIC" => Self::Image,
            "OLE" => Self::OleObject,
            "" => Self::Undefined,
            _ => return Err(UnknownDataType(code.to_string())),
        };
        Ok(datatype)
    }
}

impl TryFrom<String> for DataType {
    type Error = UnknownDataType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.code().to_string()
    }
}

/// Role cardinality of a relationship or association link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "0,1")]
    ZeroOrOne,

    #[serde(rename = "1,1")]
    ExactlyOne,

    #[serde(rename = "1,n")]
    OneOrMany,

    #[serde(rename = "0,n")]
    ZeroOrMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroOrOne => "0,1",
            Self::ExactlyOne => "1,1",
            Self::OneOrMany => "1,n",
            Self::ZeroOrMany => "0,n",
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_embedded_sizes() {
        assert_eq!(DataType::from_raw("VA50").unwrap(), DataType::VarChar);
        assert_eq!(DataType::from_raw("DC10,2").unwrap(), DataType::Decimal);
        assert_eq!(DataType::from_raw("I").unwrap(), DataType::Integer);
        assert_eq!(DataType::from_raw("").unwrap(), DataType::Undefined);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(
            DataType::from_raw("XYZ12"),
            Err(UnknownDataType("XYZ".to_string()))
        );
    }

    #[test]
    fn code_roundtrip() {
        for code in ["I", "LVA", "TXT", "DT", "OLE"] {
            let datatype: DataType = code.parse().unwrap();
            assert_eq!(datatype.code(), code);
        }
    }

    #[test]
    fn serde_forms() {
        assert_eq!(serde_json::to_string(&DataType::Money).unwrap(), "\"MN\"");
        assert_eq!(serde_json::to_string(&Cardinality::ZeroOrMany).unwrap(), "\"0,n\"");
        let card: Cardinality = serde_json::from_str("\"1,1\"").unwrap();
        assert_eq!(card, Cardinality::ExactlyOne);
    }
}
