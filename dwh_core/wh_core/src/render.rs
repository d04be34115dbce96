use common::config::components::etl::StorageConfig;
use minijinja::{context, Environment};

/// Render one step template against the storage context.
///
/// Load statements reference `{{ role_arn }}` and `{{ storage.<key> }}`;
/// statements without placeholders pass through unchanged, so every stage is
/// rendered uniformly.
pub fn render_statement(
    template: &str,
    storage: &StorageConfig,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("statement", template)?;
    let tmpl = env.get_template("statement")?;
    tmpl.render(context! {
        role_arn => storage.role_arn,
        storage => storage.locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn storage() -> StorageConfig {
        StorageConfig {
            role_arn: "arn:dwh:identity::role/storageRead".to_string(),
            locations: HashMap::from([
                (
                    "log_data".to_string(),
                    "s3://sparkplay/log_data".to_string(),
                ),
                (
                    "log_json_path".to_string(),
                    "s3://sparkplay/log_json_path.json".to_string(),
                ),
            ]),
        }
    }

    #[test]
    fn substitutes_role_arn_and_locations() {
        let template = "COPY staging_events\nFROM '{{ storage.log_data }}'\nIAM_ROLE '{{ role_arn }}'\nJSON '{{ storage.log_json_path }}';";
        let rendered = render_statement(template, &storage()).expect("template should render");

        assert!(rendered.contains("FROM 's3://sparkplay/log_data'"));
        assert!(rendered.contains("IAM_ROLE 'arn:dwh:identity::role/storageRead'"));
        assert!(rendered.contains("JSON 's3://sparkplay/log_json_path.json'"));
    }

    #[test]
    fn plain_statements_pass_through() {
        let template = "INSERT INTO users SELECT DISTINCT user_id FROM staging_events;";
        let rendered = render_statement(template, &storage()).expect("template should render");
        assert_eq!(rendered, template);
    }
}
