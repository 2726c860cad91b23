//! Job parameter extraction

use dsxlens_core::{Parameter, ParameterType};

use crate::patterns::{PARAMETER, SUBRECORD};

/// Lazily yield every parameter sub-record in document order
///
/// The iterator is finite and can be recreated at will; it borrows the document.
pub fn parameters(document: &str) -> impl Iterator<Item = Parameter> + '_ {
    SUBRECORD
        .captures_iter(document)
        .filter_map(|sub| {
            let body = sub.get(1)?.as_str();
            let caps = PARAMETER.captures(body)?;
            let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();

            Some(Parameter {
                name: field(1),
                prompt: field(2),
                default_value: field(3),
                help_text: field(4),
                param_type: ParameterType::from_code(&field(5)),
            })
        })
        .filter(|p| !p.name.trim().is_empty())
}

/// Collect all parameters
pub fn extract(document: &str) -> Vec<Parameter> {
    let params: Vec<Parameter> = parameters(document).collect();
    tracing::debug!(count = params.len(), "extracted parameters");
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
      BEGIN DSSUBRECORD
         Name "pRunDate"
         Prompt "Run date"
         Default "2023-01-01"
         HelpTxt "Business date"
         ParamType "6"
         ParamLength "0"
      END DSSUBRECORD
      BEGIN DSSUBRECORD
         Name "pBatch"
         Prompt "Batch size"
         Default "1000"
         ParamType "2"
      END DSSUBRECORD
      BEGIN DSSUBRECORD
         Name "pOdd"
         Prompt ""
         Default ""
         ParamType "99"
      END DSSUBRECORD
      BEGIN DSSUBRECORD
         Name "CUST_ID"
         SqlType "4"
      END DSSUBRECORD
"#;

    #[test]
    fn extracts_parameter_records() {
        let params = extract(DOC);
        assert_eq!(params.len(), 3);

        assert_eq!(params[0].name, "pRunDate");
        assert_eq!(params[0].prompt, "Run date");
        assert_eq!(params[0].default_value, "2023-01-01");
        assert_eq!(params[0].help_text, "Business date");
        assert_eq!(params[0].param_type, ParameterType::Date);

        assert_eq!(params[1].help_text, "");
        assert_eq!(params[1].param_type.label(), "Integer");

        assert_eq!(params[2].param_type.label(), "Unknown (99)");
    }

    #[test]
    fn help_text_does_not_leak_across_records() {
        let params = extract(DOC);
        assert_eq!(params[1].name, "pBatch");
        assert!(params[1].help_text.is_empty());
    }

    #[test]
    fn sequence_is_restartable() {
        let first: Vec<_> = parameters(DOC).map(|p| p.name).collect();
        let second: Vec<_> = parameters(DOC).map(|p| p.name).collect();
        assert_eq!(first, second);
    }
}
