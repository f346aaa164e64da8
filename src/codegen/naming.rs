//! Case conversion for entity, file and property names.
//!
//! Pure and stateless. Callers are expected to pass non-empty identifiers; the
//! helper layer is responsible for substituting an empty string for missing
//! input before reaching this module.

use convert_case::{Case, Casing};

use crate::config::{EntityCase, FileCase, PropertyCase};

/// Target case vocabulary shared by all naming choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCase {
    Pascal,
    Camel,
    /// `parameter-case` / kebab case
    Param,
    Snake,
    /// Pass-through
    Verbatim,
}

impl From<FileCase> for NameCase {
    fn from(case: FileCase) -> Self {
        match case {
            FileCase::Pascal => NameCase::Pascal,
            FileCase::Param => NameCase::Param,
            FileCase::Camel => NameCase::Camel,
            FileCase::None => NameCase::Verbatim,
        }
    }
}

impl From<EntityCase> for NameCase {
    fn from(case: EntityCase) -> Self {
        match case {
            EntityCase::Pascal => NameCase::Pascal,
            EntityCase::Camel => NameCase::Camel,
            EntityCase::None => NameCase::Verbatim,
        }
    }
}

impl From<PropertyCase> for NameCase {
    fn from(case: PropertyCase) -> Self {
        match case {
            PropertyCase::Pascal => NameCase::Pascal,
            PropertyCase::Camel => NameCase::Camel,
            PropertyCase::Snake => NameCase::Snake,
            PropertyCase::None => NameCase::Verbatim,
        }
    }
}

/// Convert `name` to the requested case
pub fn convert(name: &str, case: impl Into<NameCase>) -> String {
    debug_assert!(!name.is_empty(), "case conversion called with an empty name");

    match case.into() {
        NameCase::Pascal => to_pascal_case(name),
        NameCase::Camel => to_camel_case(name),
        NameCase::Param => to_param_case(name),
        NameCase::Snake => to_snake_case(name),
        NameCase::Verbatim => name.to_string(),
    }
}

/// Convert a string to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

/// Convert a string to camelCase
pub fn to_camel_case(s: &str) -> String {
    s.to_case(Case::Camel)
}

/// Convert a string to param-case
pub fn to_param_case(s: &str) -> String {
    s.to_case(Case::Kebab)
}

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(to_camel_case("user_profile"), "userProfile");
        assert_eq!(to_param_case("UserProfile"), "user-profile");
        assert_eq!(to_snake_case("userProfile"), "user_profile");
    }

    #[test]
    fn test_none_is_pass_through() {
        assert_eq!(convert("user_Profile", FileCase::None), "user_Profile");
        assert_eq!(convert("user_Profile", EntityCase::None), "user_Profile");
        assert_eq!(convert("user_Profile", PropertyCase::None), "user_Profile");
    }

    #[test]
    fn test_conversions_are_idempotent() {
        let names = ["user_profile", "UserProfile", "order-line-item", "createdAt", "id"];
        let cases = [
            NameCase::Pascal,
            NameCase::Camel,
            NameCase::Param,
            NameCase::Snake,
            NameCase::Verbatim,
        ];
        for name in names {
            for case in cases {
                let once = convert(name, case);
                assert_eq!(convert(&once, case), once, "{:?} of {}", case, name);
            }
        }
    }

    #[test]
    fn test_config_choices_map_to_cases() {
        assert_eq!(NameCase::from(FileCase::Param), NameCase::Param);
        assert_eq!(NameCase::from(PropertyCase::Snake), NameCase::Snake);
        assert_eq!(NameCase::from(EntityCase::Camel), NameCase::Camel);
    }
}
