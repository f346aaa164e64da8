//! Generation configuration consumed by every pipeline stage.
//!
//! A [`GenerationConfig`] is built once per invocation by merging user overrides
//! (YAML or JSON) onto the documented defaults and is read-only afterwards.
//! Every enumerated choice is a closed enum, so an unrecognized value is rejected
//! when the configuration is parsed instead of when a helper dispatches on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{GenerateError, Result};

/// Declares a closed configuration enum with its serialized spellings.
///
/// The spelling is shared by serde, `FromStr` and `Display` so that the
/// config file, the CLI and the templates all agree.
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// All accepted spellings, in declaration order
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            /// The literal spelling used in config files and templates
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = GenerateError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(GenerateError::Config(format!(
                        "Unknown {} '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        Self::VARIANTS.join(", ")
                    ))),
                }
            }
        }
    };
}

config_enum! {
    /// Case applied to generated file names
    FileCase {
        Pascal => "pascal",
        Param => "param",
        Camel => "camel",
        None => "none",
    }
}

config_enum! {
    /// Case applied to generated class names
    EntityCase {
        Pascal => "pascal",
        Camel => "camel",
        None => "none",
    }
}

config_enum! {
    /// Case applied to generated property names
    PropertyCase {
        Pascal => "pascal",
        Camel => "camel",
        Snake => "snake",
        None => "none",
    }
}

config_enum! {
    /// Line ending written into generated files
    EolStyle {
        Lf => "LF",
        Crlf => "CRLF",
    }
}

config_enum! {
    /// Visibility keyword placed before generated members
    PropertyVisibility {
        Public => "public",
        Protected => "protected",
        Private => "private",
        None => "none",
    }
}

config_enum! {
    /// Whether generated classes use named or default exports
    ExportType {
        Named => "named",
        Default => "default",
    }
}

config_enum! {
    /// Marker appended to non-nullable properties
    StrictMode {
        None => "none",
        Optional => "?",
        Definite => "!",
    }
}

impl EolStyle {
    /// Line terminator for this style
    pub fn terminator(&self) -> &'static str {
        match self {
            EolStyle::Lf => "\n",
            EolStyle::Crlf => "\r\n",
        }
    }

    /// Style matching the host platform
    pub fn platform() -> Self {
        if cfg!(windows) {
            EolStyle::Crlf
        } else {
            EolStyle::Lf
        }
    }
}

/// Options controlling naming, typing and annotation of generated sources.
///
/// Field names serialize in camelCase because templates read them as
/// `generationConfig.<field>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerationConfig {
    /// Root directory for on-disk output
    #[serde(alias = "outputDir")]
    pub results_path: PathBuf,
    pub pluralize_names: bool,
    pub no_configs: bool,
    pub convert_case_file: FileCase,
    pub convert_case_entity: EntityCase,
    pub convert_case_property: PropertyCase,
    pub convert_eol: EolStyle,
    pub property_visibility: PropertyVisibility,
    /// Wrap relation types in `Promise<...>`
    pub lazy: bool,
    /// Entities extend TypeORM's `BaseEntity`
    pub active_record: bool,
    pub generate_constructor: bool,
    pub custom_naming_strategy_path: String,
    pub relation_ids: bool,
    pub strict_mode: StrictMode,
    pub skip_schema: bool,
    /// Emit an `index.ts` barrel at the output root
    pub index_file: bool,
    pub export_type: ExportType,
    /// Keep relations; when false the pipeline strips them before rendering
    pub include_related_tables: bool,
    pub add_permission_identifier: bool,
    pub permission_identifier: String,
    #[serde(rename = "perMissionIdentifierPrefix", alias = "permissionIdentifierPrefix")]
    pub permission_identifier_prefix: String,
    pub add_swagger_identifier: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("output"),
            pluralize_names: true,
            no_configs: false,
            convert_case_file: FileCase::Param,
            convert_case_entity: EntityCase::Pascal,
            convert_case_property: PropertyCase::Camel,
            convert_eol: EolStyle::platform(),
            property_visibility: PropertyVisibility::None,
            lazy: false,
            active_record: false,
            generate_constructor: false,
            custom_naming_strategy_path: String::new(),
            relation_ids: false,
            strict_mode: StrictMode::None,
            skip_schema: false,
            index_file: false,
            export_type: ExportType::Named,
            include_related_tables: true,
            add_permission_identifier: false,
            permission_identifier: "@permission".to_string(),
            permission_identifier_prefix: String::new(),
            add_swagger_identifier: false,
        }
    }
}

impl GenerationConfig {
    /// Merge YAML overrides onto the defaults.
    ///
    /// Keys that are absent keep their default value; an unknown key or an
    /// unknown enum spelling is a configuration error.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
            .map_err(|e| GenerateError::Config(format!("Failed to parse generation config: {}", e)))
    }

    /// Merge JSON overrides onto the defaults
    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| GenerateError::Config(format!("Failed to parse generation config: {}", e)))
    }

    /// Load overrides from a `.yaml`, `.yml` or `.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
        .map_err(|e| match e {
            GenerateError::Config(msg) => {
                GenerateError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Set the output directory
    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_record() {
        let config = GenerationConfig::default();
        assert_eq!(config.convert_case_file, FileCase::Param);
        assert_eq!(config.convert_case_entity, EntityCase::Pascal);
        assert_eq!(config.convert_case_property, PropertyCase::Camel);
        assert_eq!(config.permission_identifier, "@permission");
        assert!(config.pluralize_names);
        assert!(config.include_related_tables);
        assert!(!config.lazy);
        assert!(!config.add_swagger_identifier);
    }

    #[test]
    fn test_overrides_merge_onto_defaults() {
        let yaml = r#"
lazy: true
convertCaseFile: camel
strictMode: "!"
perMissionIdentifierPrefix: system
"#;
        let config = GenerationConfig::from_yaml_str(yaml).unwrap();
        assert!(config.lazy);
        assert_eq!(config.convert_case_file, FileCase::Camel);
        assert_eq!(config.strict_mode, StrictMode::Definite);
        assert_eq!(config.permission_identifier_prefix, "system");
        // untouched fields keep defaults
        assert_eq!(config.convert_case_property, PropertyCase::Camel);
        assert_eq!(config.export_type, ExportType::Named);
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        let err = GenerationConfig::from_yaml_str("convertCaseFile: kebab\n").unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(GenerationConfig::from_yaml_str("lazzy: true\n").is_err());
    }

    #[test]
    fn test_json_overrides() {
        let config =
            GenerationConfig::from_json_str(r#"{"exportType": "default", "indexFile": true}"#)
                .unwrap();
        assert_eq!(config.export_type, ExportType::Default);
        assert!(config.index_file);
    }

    #[test]
    fn test_enum_from_str_round_trips_spelling() {
        assert_eq!("param".parse::<FileCase>().unwrap(), FileCase::Param);
        assert_eq!("CRLF".parse::<EolStyle>().unwrap().terminator(), "\r\n");
        assert_eq!(StrictMode::Optional.to_string(), "?");
        assert!("kebab".parse::<FileCase>().is_err());
    }

    #[test]
    fn test_serializes_camel_case_for_templates() {
        let value = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(value["convertCaseFile"], "param");
        assert_eq!(value["addSwaggerIdentifier"], false);
        assert_eq!(value["perMissionIdentifierPrefix"], "");
    }
}
