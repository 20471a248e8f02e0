//! Payloads of the built-in source types.
//!
//! Every payload decodes its attributes with serde (unknown attributes are
//! rejected) and then applies its own semantic checks, so a payload value
//! that exists is always valid.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::constants::{DEFAULT_SEPARATOR, REGISTRY_CURRENT_USER_PREFIX, REGISTRY_KEY_PREFIXES};
use crate::errors::{Error, Result};
use crate::source_type::{mapping_key, string_sequence};

/// Decode source attributes into a typed payload.
fn decode<T: DeserializeOwned>(type_indicator: &str, attributes: &Mapping) -> Result<T> {
    serde_yaml::from_value(Value::Mapping(attributes.clone())).map_err(|e| {
        Error::format(format!("Invalid {} source attributes: {}", type_indicator, e))
    })
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// Validates a Windows Registry key path against the supported prefixes.
///
/// The check is case-sensitive. `HKEY_CURRENT_USER\` gets a dedicated error
/// pointing at the `HKEY_USERS\%%users.sid%%\` form.
pub fn validate_registry_key(key_path: &str) -> Result<()> {
    if REGISTRY_KEY_PREFIXES
        .iter()
        .any(|prefix| key_path.starts_with(prefix))
    {
        return Ok(());
    }

    if key_path.starts_with(REGISTRY_CURRENT_USER_PREFIX) {
        return Err(Error::format(
            "HKEY_CURRENT_USER\\ is not supported instead use: HKEY_USERS\\%%users.sid%%\\",
        ));
    }

    Err(Error::format(format!(
        "Unsupported Registry key path: {}",
        key_path
    )))
}

/// References to other artifact definitions, resolved by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactGroupSource {
    pub names: Vec<String>,
}

impl ArtifactGroupSource {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::format("Missing names value."));
        }
        Ok(Self { names })
    }

    pub fn from_attributes(type_indicator: &str, attributes: &Mapping) -> Result<Self> {
        let decoded: Self = decode(type_indicator, attributes)?;
        Self::new(decoded.names)
    }

    pub fn as_dict(&self) -> Mapping {
        let mut attributes = Mapping::new();
        attributes.insert(mapping_key("names"), string_sequence(&self.names));
        attributes
    }
}

/// A command whose output is the evidence.
///
/// Both `cmd` and `args` must be set in the document; `args` may be an
/// empty list but not null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSource {
    pub cmd: String,
    pub args: Vec<String>,
}

/// Document form of a command, null and absent values both decode to `None`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandAttributes {
    #[serde(default)]
    cmd: Option<String>,
    #[serde(default)]
    args: Option<Vec<String>>,
}

impl CommandSource {
    pub fn new(cmd: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args,
        }
    }

    pub fn from_attributes(type_indicator: &str, attributes: &Mapping) -> Result<Self> {
        let decoded: CommandAttributes = decode(type_indicator, attributes)?;
        match (decoded.cmd, decoded.args) {
            (Some(cmd), Some(args)) => Ok(Self::new(cmd, args)),
            _ => Err(Error::format("Missing args or cmd value.")),
        }
    }

    pub fn as_dict(&self) -> Mapping {
        let mut attributes = Mapping::new();
        attributes.insert(mapping_key("cmd"), Value::String(self.cmd.clone()));
        attributes.insert(mapping_key("args"), string_sequence(&self.args));
        attributes
    }
}

/// Paths shared by the `FILE`, `PATH` and deprecated `DIRECTORY` kinds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathSource {
    pub paths: Vec<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl PathSource {
    pub fn new(paths: Vec<String>, separator: Option<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::format("Missing paths value."));
        }
        Ok(Self {
            paths,
            separator: separator.unwrap_or_else(default_separator),
        })
    }

    pub fn from_attributes(type_indicator: &str, attributes: &Mapping) -> Result<Self> {
        let decoded: Self = decode(type_indicator, attributes)?;
        Self::new(decoded.paths, Some(decoded.separator))
    }

    pub fn as_dict(&self) -> Mapping {
        let mut attributes = Mapping::new();
        attributes.insert(mapping_key("paths"), string_sequence(&self.paths));
        if self.separator != DEFAULT_SEPARATOR {
            attributes.insert(mapping_key("separator"), Value::String(self.separator.clone()));
        }
        attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryKeySource {
    pub keys: Vec<String>,
}

impl RegistryKeySource {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::format("Missing keys value."));
        }
        for key in &keys {
            validate_registry_key(key)?;
        }
        Ok(Self { keys })
    }

    pub fn from_attributes(type_indicator: &str, attributes: &Mapping) -> Result<Self> {
        let decoded: Self = decode(type_indicator, attributes)?;
        Self::new(decoded.keys)
    }

    pub fn as_dict(&self) -> Mapping {
        let mut attributes = Mapping::new();
        attributes.insert(mapping_key("keys"), string_sequence(&self.keys));
        attributes
    }
}

/// A Windows Registry key path and the name of a value within that key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn as_dict(&self) -> Value {
        let mut pair = Mapping::new();
        pair.insert(mapping_key("key"), Value::String(self.key.clone()));
        pair.insert(mapping_key("value"), Value::String(self.value.clone()));
        Value::Mapping(pair)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryValueSource {
    pub key_value_pairs: Vec<KeyValuePair>,
}

impl RegistryValueSource {
    pub fn new(key_value_pairs: Vec<KeyValuePair>) -> Result<Self> {
        if key_value_pairs.is_empty() {
            return Err(Error::format("Missing key value pairs value."));
        }
        for pair in &key_value_pairs {
            validate_registry_key(&pair.key)?;
        }
        Ok(Self { key_value_pairs })
    }

    pub fn from_attributes(type_indicator: &str, attributes: &Mapping) -> Result<Self> {
        let decoded: Self = decode(type_indicator, attributes)?;
        Self::new(decoded.key_value_pairs)
    }

    pub fn as_dict(&self) -> Mapping {
        let mut attributes = Mapping::new();
        attributes.insert(
            mapping_key("key_value_pairs"),
            Value::Sequence(self.key_value_pairs.iter().map(KeyValuePair::as_dict).collect()),
        );
        attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WmiQuerySource {
    pub query: String,
    #[serde(default)]
    pub base_object: Option<String>,
}

impl WmiQuerySource {
    pub fn new(query: impl Into<String>, base_object: Option<String>) -> Result<Self> {
        let query = query.into();
        if query.is_empty() {
            return Err(Error::format("Missing query value."));
        }
        Ok(Self { query, base_object })
    }

    pub fn from_attributes(type_indicator: &str, attributes: &Mapping) -> Result<Self> {
        let decoded: Self = decode(type_indicator, attributes)?;
        Self::new(decoded.query, decoded.base_object)
    }

    pub fn as_dict(&self) -> Mapping {
        let mut attributes = Mapping::new();
        attributes.insert(mapping_key("query"), Value::String(self.query.clone()));
        if let Some(base_object) = self.base_object.as_ref().filter(|b| !b.is_empty()) {
            attributes.insert(mapping_key("base_object"), Value::String(base_object.clone()));
        }
        attributes
    }
}

/// A source kind registered at runtime through the factory.
///
/// The attributes are kept as given; the registered constructor is
/// responsible for validating them.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSource {
    pub type_indicator: String,
    pub attributes: Mapping,
}

impl CustomSource {
    pub fn new(type_indicator: impl Into<String>, attributes: Mapping) -> Self {
        Self {
            type_indicator: type_indicator.into(),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_registry_key_prefixes() {
        assert!(validate_registry_key("HKEY_LOCAL_MACHINE\\Foo").is_ok());
        assert!(validate_registry_key("HKEY_USERS\\%%users.sid%%\\Foo").is_ok());
        assert!(validate_registry_key("HKEY_CLASSES_ROOT\\.exe").is_ok());
        assert!(validate_registry_key("%%current_control_set%%\\Services").is_ok());
    }

    #[test]
    fn test_registry_key_current_user_rejected() {
        let err = validate_registry_key("HKEY_CURRENT_USER\\Foo").unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("HKEY_USERS\\%%users.sid%%\\"));
    }

    #[test]
    fn test_registry_key_prefix_is_case_sensitive() {
        assert!(validate_registry_key("hkey_local_machine\\Foo").is_err());
        assert!(validate_registry_key("HKLM\\Foo").is_err());
        assert!(validate_registry_key("%%CURRENT_CONTROL_SET%%\\Foo").is_err());
    }

    #[test]
    fn test_artifact_group_requires_names() {
        assert!(ArtifactGroupSource::new(vec!["test".to_string()]).is_ok());
        assert!(ArtifactGroupSource::new(Vec::new()).is_err());
        assert!(ArtifactGroupSource::from_attributes("ARTIFACT_GROUP", &Mapping::new()).is_err());
        assert!(ArtifactGroupSource::from_attributes("ARTIFACT_GROUP", &attributes("names: []")).is_err());
    }

    #[test]
    fn test_command_requires_cmd_and_args() {
        let source = CommandSource::from_attributes("COMMAND", &attributes("cmd: /bin/ls\nargs: []")).unwrap();
        assert_eq!(source.cmd, "/bin/ls");
        assert!(source.args.is_empty());

        assert!(CommandSource::from_attributes("COMMAND", &attributes("cmd: /bin/ls")).is_err());
        assert!(CommandSource::from_attributes("COMMAND", &attributes("args: [-l]")).is_err());
    }

    #[test]
    fn test_command_rejects_null_values() {
        let err = CommandSource::from_attributes("COMMAND", &attributes("cmd: /bin/rpm\nargs: ~"))
            .unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(err.to_string(), "Missing args or cmd value.");

        let err = CommandSource::from_attributes("COMMAND", &attributes("cmd: ~\nargs: [-qa]"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing args or cmd value.");

        assert!(CommandSource::from_attributes("COMMAND", &attributes("cmd: /bin/rpm\nargs: [-qa]\nextra: 1")).is_err());
    }

    #[test]
    fn test_path_source_separator() {
        let source = PathSource::from_attributes("FILE", &attributes("paths: [test]")).unwrap();
        assert_eq!(source.separator, "/");
        assert!(!source.as_dict().contains_key("separator"));

        let source = PathSource::from_attributes("FILE", &attributes("paths: [test]\nseparator: '\\'")).unwrap();
        assert_eq!(source.separator, "\\");
        assert!(source.as_dict().contains_key("separator"));
    }

    #[test]
    fn test_path_source_rejects_bare_string_and_unknown_attribute() {
        assert!(PathSource::from_attributes("FILE", &attributes("paths: test")).is_err());
        assert!(PathSource::from_attributes("FILE", &attributes("broken: [test]")).is_err());
        assert!(PathSource::from_attributes("FILE", &attributes("paths: [test]\nextra: 1")).is_err());
    }

    #[test]
    fn test_registry_key_source() {
        assert!(RegistryKeySource::from_attributes(
            "REGISTRY_KEY",
            &attributes("keys: ['HKEY_LOCAL_MACHINE\\test']")
        )
        .is_ok());
        assert!(RegistryKeySource::from_attributes(
            "REGISTRY_KEY",
            &attributes("keys: 'HKEY_LOCAL_MACHINE\\test'")
        )
        .is_err());
        assert!(RegistryKeySource::new(vec!["HKEY_CURRENT_USER\\Software".to_string()]).is_err());
    }

    #[test]
    fn test_registry_value_pairs() {
        let source = RegistryValueSource::from_attributes(
            "REGISTRY_VALUE",
            &attributes("key_value_pairs:\n- {key: 'HKEY_LOCAL_MACHINE\\test', value: test}"),
        )
        .unwrap();
        assert_eq!(source.key_value_pairs[0].value, "test");

        let bad_pair = attributes("key_value_pairs:\n- {bad: test, value: test}");
        assert!(RegistryValueSource::from_attributes("REGISTRY_VALUE", &bad_pair).is_err());

        let extra_key = attributes("key_value_pairs:\n- {key: 'HKEY_USERS\\x', value: a, type: b}");
        assert!(RegistryValueSource::from_attributes("REGISTRY_VALUE", &extra_key).is_err());

        let not_a_list = attributes("key_value_pairs: {key: 'HKEY_LOCAL_MACHINE\\test', value: test}");
        assert!(RegistryValueSource::from_attributes("REGISTRY_VALUE", &not_a_list).is_err());

        let bad_prefix = attributes("key_value_pairs:\n- {key: 'HKEY_CURRENT_USER\\x', value: a}");
        assert!(RegistryValueSource::from_attributes("REGISTRY_VALUE", &bad_prefix).is_err());
    }

    #[test]
    fn test_wmi_query() {
        let source = WmiQuerySource::from_attributes("WMI", &attributes("query: test")).unwrap();
        assert_eq!(source.base_object, None);
        assert!(!source.as_dict().contains_key("base_object"));

        let source = WmiQuerySource::from_attributes(
            "WMI",
            &attributes("query: test\nbase_object: winmgmts:\\root\\cimv2"),
        )
        .unwrap();
        assert!(source.as_dict().contains_key("base_object"));

        assert!(WmiQuerySource::from_attributes("WMI", &attributes("query: ''")).is_err());
        assert!(WmiQuerySource::from_attributes("WMI", &Mapping::new()).is_err());
    }
}
