//! Pattern catalog
//!
//! One compiled matcher per construct of the DSX grammar. All patterns are
//! stateless and shared by every extractor.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

macro_rules! pattern {
    ($(#[$meta:meta])* $name:ident = $re:expr) => {
        $(#[$meta])*
        pub static $name: Lazy<Regex> = Lazy::new(|| compile($re));
    };
}

/// Header line opening a record
pub const RECORD_HEADER: &str = "BEGIN DSRECORD";

// Record brackets

pattern!(
    /// `BEGIN DSRECORD ... END DSRECORD`, body in group 1
    RECORD = r"(?s)BEGIN DSRECORD(.*?)END DSRECORD"
);
pattern!(
    /// `BEGIN DSSUBRECORD ... END DSSUBRECORD`, body in group 1
    SUBRECORD = r"(?s)BEGIN DSSUBRECORD(.*?)END DSSUBRECORD"
);

// Quoted key/value fields

pattern!(IDENTIFIER = r#"Identifier "([^"]*)""#);
pattern!(NAME = r#"(?m)^[ \t]*Name "((?:[^"\\]|\\.)*)""#);
pattern!(VALUE = r#"(?m)^[ \t]*Value "((?:[^"\\]|\\.)*)""#);
pattern!(OLE_TYPE = r#"OLEType "([^"]*)""#);
pattern!(STAGE_TYPE = r#"StageType "([^"]*)""#);
pattern!(PARTNER = r#"Partner "([^"|]*)"#);
pattern!(JOB_TYPE = r#"JobType "([^"]*)""#);
pattern!(TOOL_VERSION = r#"ToolVersion "([^"]*)""#);
pattern!(SHORT_DESCRIPTION = r#"(?m)^[ \t]*Description "((?:[^"\\]|\\.)*)""#);

// Sentinel-delimited blocks

pattern!(PARAGRAPH_BREAK = r"\r?\n[ \t]*\r?\n");
pattern!(FULL_DESCRIPTION = r"(?s)FullDescription =\+=\+=\+=(.*?)=\+=\+=\+=");
pattern!(
    /// Property block of a stage; XML body in group 1
    XML_PROPERTIES = r#"(?s)Name "XMLProperties"\s+Value =\+=\+=\+=(.*?)=\+=\+=\+="#
);
pattern!(
    /// Generated transformer code; body in group 1
    TRANSFORM_CODE = r#"(?s)Name "TrxGenCode"\s+Value =\+=\+=\+=(.*?)=\+=\+=\+="#
);

// Parameters

pattern!(
    /// Parameter sub-record body: name, prompt, default, optional help, type code
    PARAMETER = r#"(?s)^\s*Name "([^"]*)"\s+Prompt "([^"]*)"\s+Default "([^"]*)".*?(?:HelpTxt "([^"]*)".*?)?ParamType "([^"]*)""#
);

// Pipe-delimited parallel lists

pattern!(STAGE_LIST = r#"StageList "([^"]*)""#);
pattern!(STAGE_NAMES = r#"StageNames "([^"]*)""#);
pattern!(LINK_NAMES = r#"LinkNames "([^"]*)""#);
pattern!(LINK_SOURCE_PINS = r#"LinkSourcePinIDs "([^"]*)""#);
pattern!(LINK_TARGET_STAGES = r#"LinkTargetStageIDs "([^"]*)""#);
pattern!(
    /// Pin identifier: stage identifier in group 1, pin position suffix after it
    PIN_ID = r"^(.+?)P\d+$"
);

// Embedded XML property elements

pattern!(CONTEXT = r"<Context\b[^>]*>\s*(?:<!\[CDATA\[)?\s*(\d+)");
pattern!(SELECT_STATEMENT = r"(?s)<SelectStatement\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");
pattern!(BEFORE_SQL = r"(?s)<BeforeSQL\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");
pattern!(AFTER_SQL = r"(?s)<AfterSQL\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");
pattern!(TABLE_NAME = r"(?s)<TableName\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");
pattern!(WRITE_MODE = r"(?s)<WriteMode\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");
pattern!(CONNECTION = r"(?s)<(?:DataSource|Server)\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");
pattern!(DATABASE = r"(?s)<Database\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))");

// SQL text

pattern!(BLOCK_COMMENT = r"(?s)/\*.*?\*/");
pattern!(WHITESPACE = r"\s+");
pattern!(SPACE_RUN = r"[ \t]{2,}");
pattern!(INDENTED_LINE_BREAK = r"\r?\n[ \t]*");
pattern!(
    /// Predicate text after each `WHERE`, up to the next clause or end of string
    WHERE_CLAUSE = r"(?is)\bWHERE\b(.*?)(?:\bGROUP\s+BY\b|\bORDER\s+BY\b|\bHAVING\b|$)"
);
pattern!(SQL_VERB = r"(?i)\b(?:SELECT|INSERT|UPDATE|DELETE|CREATE|DROP|ALTER)\b");
pattern!(PARAM_PLACEHOLDER = r"#[^#]*#");

// Dataset targets

pattern!(DATASET = r#"Name "dataset"\s+Value "([^"]*)""#);
pattern!(DATASET_MODE = r#"Name "mode"\s+Value "([^"]*)""#);

// Transformer code

pattern!(INPUT_DECLARATION = r"\binputname\s+\d+\s+(\w+)\s*;");
pattern!(OUTPUT_DECLARATION = r"\boutputname\s+\d+\s+(\w+)\s*;");
pattern!(
    /// `if (<predicate>) { reject...; }`, predicate in group 1
    REJECT_GUARD = r"\bif\s*\((.+)\)\s*\{\s*reject\w*[^;{}]*;\s*\}"
);
pattern!(
    TYPE_DECLARATION = r"^(?:u?int(?:8|16|32|64)|[sd]float|u?string(?:\[[^\]]*\])?|decimal(?:\[[^\]]*\])?|date|time|timestamp|raw|bool)\s+[A-Za-z_]\w*"
);
pattern!(
    FRAMEWORK_HOOK = r"\b(?:reject|rejectRecord|setNull|setnull|inputname|outputname|initialize|mainloop|finish|writerecord|writeRecord|transferrecord|transferRecord|dropRecord)\b"
);

// Lookups

pattern!(LOOKUP_FAIL = r#"LookupFail "([^"]*)""#);
pattern!(LINK_NAME = r#"LinkName "([^"]*)""#);
pattern!(KEY_POSITION = r#"KeyPosition "(\d+)""#);
pattern!(LOOKUP_TYPE = r#"LookupType "([^"]*)""#);
pattern!(RESIDUAL = r#"Residual "([^"]*)""#);

// Columns

pattern!(SQL_TYPE = r#"SqlType "(-?\d+)""#);
pattern!(PRECISION = r#"Precision "(\d+)""#);
pattern!(SCALE = r#"Scale "(\d+)""#);
pattern!(NULLABLE = r#"Nullable "(\d+)""#);
pattern!(DERIVATION = r#"Derivation "((?:[^"\\]|\\.)*)""#);

/// First capture group of the first match, if any
pub fn capture<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First non-empty group of a two-alternative element pattern (CDATA or plain text)
pub fn element_text<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    let caps = pattern.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Record-level part of a record body: everything before its first sub-record
pub fn record_head(body: &str) -> &str {
    match body.find("BEGIN DSSUBRECORD") {
        Some(pos) => &body[..pos],
        None => body,
    }
}
