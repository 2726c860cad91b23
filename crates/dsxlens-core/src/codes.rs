//! Code map tables
//!
//! DSX exports store most enumerations as small integer codes. These tables
//! map them to stable labels. Codes outside a table are preserved as
//! `Unknown (code)` so nothing is silently lost.

use serde::{Deserialize, Serialize};

/// Prefix used for codes missing from the job and parameter tables
const UNKNOWN_LABEL: &str = "Unknown";

fn unknown_label(code: &str) -> String {
    format!("{} ({})", UNKNOWN_LABEL, code)
}

/// Recover the raw code from an `Unknown (code)` label
fn parse_unknown_label(label: &str) -> Option<&str> {
    label
        .strip_prefix(UNKNOWN_LABEL)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Job type (`JobType` field of the job record)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobType {
    Server,
    Mainframe,
    Sequence,
    Parallel,

    /// Code present but not in the table
    Unknown(String),

    /// The `JobType` field itself was absent; serializes as an empty string
    #[default]
    Unspecified,
}

impl JobType {
    /// Map a `JobType` code
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Server,
            "1" => Self::Mainframe,
            "2" => Self::Sequence,
            "3" => Self::Parallel,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Human-readable label
    pub fn label(&self) -> String {
        match self {
            Self::Server => "Server".to_string(),
            Self::Mainframe => "Mainframe".to_string(),
            Self::Sequence => "Sequence".to_string(),
            Self::Parallel => "Parallel".to_string(),
            Self::Unknown(code) => unknown_label(code),
            Self::Unspecified => String::new(),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<JobType> for String {
    fn from(value: JobType) -> Self {
        value.label()
    }
}

impl From<String> for JobType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "" => Self::Unspecified,
            "Server" => Self::Server,
            "Mainframe" => Self::Mainframe,
            "Sequence" => Self::Sequence,
            "Parallel" => Self::Parallel,
            other => Self::Unknown(parse_unknown_label(other).unwrap_or(other).to_string()),
        }
    }
}

/// Job parameter type (`ParamType` field of a parameter sub-record)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParameterType {
    String,
    Integer,
    Float,
    Pathname,
    List,
    Date,
    Time,
    Timestamp,
    EnvironmentVar,
    Unknown(String),
}

impl ParameterType {
    /// Map a `ParamType` code
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::String,
            "2" => Self::Integer,
            "3" => Self::Float,
            "4" => Self::Pathname,
            "5" => Self::List,
            "6" => Self::Date,
            "7" => Self::Time,
            "8" => Self::Timestamp,
            "9" => Self::EnvironmentVar,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::String => "String".to_string(),
            Self::Integer => "Integer".to_string(),
            Self::Float => "Float".to_string(),
            Self::Pathname => "Pathname".to_string(),
            Self::List => "List".to_string(),
            Self::Date => "Date".to_string(),
            Self::Time => "Time".to_string(),
            Self::Timestamp => "Timestamp".to_string(),
            Self::EnvironmentVar => "EnvironmentVar".to_string(),
            Self::Unknown(code) => unknown_label(code),
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<ParameterType> for String {
    fn from(value: ParameterType) -> Self {
        value.label()
    }
}

impl From<String> for ParameterType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "String" => Self::String,
            "Integer" => Self::Integer,
            "Float" => Self::Float,
            "Pathname" => Self::Pathname,
            "List" => Self::List,
            "Date" => Self::Date,
            "Time" => Self::Time,
            "Timestamp" => Self::Timestamp,
            "EnvironmentVar" => Self::EnvironmentVar,
            other => Self::Unknown(parse_unknown_label(other).unwrap_or(other).to_string()),
        }
    }
}

/// Target write mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteMode {
    Append,
    Create,
    Truncate,
    Replace,
}

impl WriteMode {
    /// Map a numeric `WriteMode` code; out-of-range codes are ignored
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::Append),
            "1" => Some(Self::Create),
            "2" => Some(Self::Truncate),
            "3" => Some(Self::Replace),
            _ => None,
        }
    }

    /// Map a dataset stage `mode` property value
    pub fn from_mode_name(mode: &str) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "append" => Some(Self::Append),
            "create" => Some(Self::Create),
            "truncate" => Some(Self::Truncate),
            "overwrite" | "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Append => write!(f, "Append"),
            Self::Create => write!(f, "Create"),
            Self::Truncate => write!(f, "Truncate"),
            Self::Replace => write!(f, "Replace"),
        }
    }
}

/// Lookup method. Unmapped codes pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LookupMethod {
    Normal,
    Sparse,
    Range,
    Other(String),
}

impl LookupMethod {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Normal,
            "1" => Self::Sparse,
            "2" => Self::Range,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Normal => "Normal",
            Self::Sparse => "Sparse",
            Self::Range => "Range",
            Self::Other(raw) => raw,
        }
    }
}

impl From<LookupMethod> for String {
    fn from(value: LookupMethod) -> Self {
        value.label().to_string()
    }
}

impl From<String> for LookupMethod {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Normal" => Self::Normal,
            "Sparse" => Self::Sparse,
            "Range" => Self::Range,
            _ => Self::Other(label),
        }
    }
}

/// Role of an embedded SQL fragment within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptRole {
    #[serde(rename = "BeforeSQL")]
    BeforeSql,
    #[serde(rename = "AfterSQL")]
    AfterSql,
    SelectStatement,
}

impl ScriptRole {
    /// Fragment roles in extraction order
    pub const ALL: [ScriptRole; 3] = [Self::BeforeSql, Self::AfterSql, Self::SelectStatement];

    /// Property element name carrying this fragment
    pub fn element(&self) -> &'static str {
        match self {
            Self::BeforeSql => "BeforeSQL",
            Self::AfterSql => "AfterSQL",
            Self::SelectStatement => "SelectStatement",
        }
    }
}

impl std::fmt::Display for ScriptRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.element())
    }
}

/// How a SQL type renders its precision and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizeSuffix {
    None,
    Length,
    PrecisionScale,
}

/// ODBC SQL type codes as used by `SqlType`
static SQL_TYPES: &[(i32, &str, SizeSuffix)] = &[
    (1, "CHAR", SizeSuffix::Length),
    (12, "VARCHAR", SizeSuffix::Length),
    (-1, "LONGVARCHAR", SizeSuffix::Length),
    (-8, "NCHAR", SizeSuffix::Length),
    (-9, "NVARCHAR", SizeSuffix::Length),
    (-10, "LONGNVARCHAR", SizeSuffix::Length),
    (2, "NUMERIC", SizeSuffix::PrecisionScale),
    (3, "DECIMAL", SizeSuffix::PrecisionScale),
    (4, "INTEGER", SizeSuffix::None),
    (5, "SMALLINT", SizeSuffix::None),
    (-5, "BIGINT", SizeSuffix::None),
    (-6, "TINYINT", SizeSuffix::None),
    (-7, "BIT", SizeSuffix::None),
    (6, "FLOAT", SizeSuffix::None),
    (7, "REAL", SizeSuffix::None),
    (8, "DOUBLE", SizeSuffix::None),
    (9, "DATE", SizeSuffix::None),
    (91, "DATE", SizeSuffix::None),
    (10, "TIME", SizeSuffix::None),
    (92, "TIME", SizeSuffix::None),
    (11, "TIMESTAMP", SizeSuffix::None),
    (93, "TIMESTAMP", SizeSuffix::None),
    (-2, "BINARY", SizeSuffix::None),
    (-3, "VARBINARY", SizeSuffix::None),
    (-4, "LONGVARBINARY", SizeSuffix::None),
];

fn sql_type_entry(code: &str) -> Option<&'static (i32, &'static str, SizeSuffix)> {
    let code: i32 = code.trim().parse().ok()?;
    SQL_TYPES.iter().find(|(c, _, _)| *c == code)
}

/// Base type name for a `SqlType` code
pub fn sql_type_name(code: &str) -> Option<&'static str> {
    sql_type_entry(code).map(|(_, name, _)| *name)
}

/// Render a column type, e.g. `VARCHAR(50)`, `DECIMAL(12,2)`, `INTEGER` or `UNKNOWN(77)`
///
/// Precision/scale are only shown for character and numeric/decimal types, and
/// only when precision is non-zero.
pub fn format_column_type(code: &str, precision: u32, scale: u32) -> String {
    let Some((_, name, suffix)) = sql_type_entry(code) else {
        return format!("UNKNOWN({})", code.trim());
    };

    match suffix {
        SizeSuffix::Length if precision > 0 => format!("{}({})", name, precision),
        SizeSuffix::PrecisionScale if precision > 0 && scale > 0 => {
            format!("{}({},{})", name, precision, scale)
        }
        SizeSuffix::PrecisionScale if precision > 0 => format!("{}({})", name, precision),
        _ => name.to_string(),
    }
}
