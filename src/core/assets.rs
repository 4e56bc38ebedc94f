//! Embedded reference documents.
//!
//! The reference constitution is baked into the binary so `specgate validate`
//! works without any external files.

/// Embed documents at compile time as text.
///
/// Generates:
/// - Public constants for each embedded document
/// - `get_embedded_doc(name)` function for lookup
/// - `list_docs()` function for discovery
macro_rules! embedded_docs {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str =
                include_str!(concat!("../../constitution/", $path));
        )*

        pub fn get_embedded_doc(name: &str) -> Option<&'static str> {
            let key = name.strip_prefix("constitution/").unwrap_or(name);
            match key {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }

        pub fn list_docs() -> Vec<&'static str> {
            vec![ $( $path, )* ]
        }
    };
}

embedded_docs! {
    "CONSTITUTION.md" => EMBEDDED_CONSTITUTION,
    "SPEC_TEMPLATE.md" => EMBEDDED_SPEC_TEMPLATE,
}

/// Name of the constitution used when the caller supplies none.
pub const DEFAULT_CONSTITUTION: &str = "CONSTITUTION.md";
