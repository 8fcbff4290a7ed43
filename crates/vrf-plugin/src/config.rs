//! Network configuration read from stdin.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vrf_common::LinkName;

use crate::error::{PluginError, PluginResult};

/// Network configuration for the VRF plugin.
///
/// Keys other than the ones below are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetConf {
    /// CNI specification version of this configuration.
    pub cni_version: String,
    /// Network name.
    #[serde(default)]
    pub name: String,
    /// Plugin type.
    #[serde(rename = "type", default)]
    pub plugin_type: String,
    /// Name of the VRF to add the interface to.
    #[serde(rename = "vrfname", default)]
    pub vrf_name: String,
    /// Result of the previous plugin in the chain, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_result: Option<Value>,
}

impl NetConf {
    /// Parse and validate a configuration.
    ///
    /// # Errors
    ///
    /// - [`PluginError::Decode`] if the input is not a configuration object.
    /// - [`PluginError::InvalidConfig`] if `vrfname` is missing or not a valid link name.
    pub fn parse(data: &[u8]) -> PluginResult<Self> {
        let conf: Self = serde_json::from_slice(data).map_err(|e| PluginError::Decode {
            message: e.to_string(),
        })?;

        if conf.vrf_name.is_empty() {
            return Err(PluginError::InvalidConfig {
                message: "configuration is expected to have a valid vrf name".to_string(),
            });
        }
        LinkName::new(conf.vrf_name.as_str()).map_err(|e| PluginError::InvalidConfig {
            message: e.to_string(),
        })?;

        Ok(conf)
    }

    /// Best-effort read of `cniVersion`, used to label error replies.
    #[must_use]
    pub fn peek_version(data: &[u8]) -> Option<String> {
        let value: Value = serde_json::from_slice(data).ok()?;
        value.get("cniVersion")?.as_str().map(ToString::to_string)
    }

    /// The previous plugin result.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidConfig`] if there is none.
    pub fn prev_result(&self) -> PluginResult<&Value> {
        self.prev_result
            .as_ref()
            .ok_or_else(|| PluginError::InvalidConfig {
                message: "missing prevResult from earlier plugin".to_string(),
            })
    }

    /// The previous result restated in this configuration's version.
    ///
    /// The VRF plugin adds no interfaces, addresses or routes, so everything
    /// except `cniVersion` passes through untouched.
    ///
    /// # Errors
    ///
    /// - [`PluginError::InvalidConfig`] if there is no previous result.
    /// - [`PluginError::Decode`] if it is not a JSON object.
    pub fn pass_through_result(&self) -> PluginResult<Value> {
        let mut result = self.prev_result()?.clone();
        let object = result.as_object_mut().ok_or_else(|| PluginError::Decode {
            message: "prevResult is not an object".to_string(),
        })?;
        object.insert(
            "cniVersion".to_string(),
            Value::String(self.cni_version.clone()),
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conf(value: &Value) -> PluginResult<NetConf> {
        NetConf::parse(value.to_string().as_bytes())
    }

    #[test]
    fn parses_minimal_config() {
        let parsed = conf(&json!({
            "cniVersion": "1.0.0",
            "name": "net",
            "type": "vrf",
            "vrfname": "blue",
            "dns": {}
        }))
        .unwrap();
        assert_eq!(parsed.vrf_name, "blue");
        assert_eq!(parsed.plugin_type, "vrf");
        assert!(parsed.prev_result.is_none());
    }

    #[test]
    fn requires_vrf_name() {
        let err = conf(&json!({ "cniVersion": "1.0.0", "type": "vrf" })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration is expected to have a valid vrf name"
        );

        let err = conf(&json!({ "cniVersion": "1.0.0", "vrfname": "no/slash" })).unwrap_err();
        assert!(matches!(err, PluginError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            NetConf::parse(b"{not json"),
            Err(PluginError::Decode { .. })
        ));
        assert!(matches!(
            NetConf::parse(br#"{"vrfname": "blue"}"#),
            Err(PluginError::Decode { .. })
        ));
    }

    #[test]
    fn peeks_version_of_invalid_config() {
        assert_eq!(
            NetConf::peek_version(br#"{"cniVersion": "0.4.0"}"#),
            Some("0.4.0".to_string())
        );
        assert_eq!(NetConf::peek_version(b"garbage"), None);
    }

    #[test]
    fn passes_previous_result_through() {
        let prev = json!({
            "cniVersion": "0.4.0",
            "interfaces": [{ "name": "eth0", "sandbox": "/var/run/netns/test" }],
            "ips": [{ "version": "4", "address": "10.0.0.2/24", "interface": 0 }],
        });
        let parsed = conf(&json!({
            "cniVersion": "1.0.0",
            "vrfname": "blue",
            "prevResult": prev.clone(),
        }))
        .unwrap();

        let result = parsed.pass_through_result().unwrap();
        assert_eq!(result["cniVersion"], "1.0.0");
        assert_eq!(result["interfaces"], prev["interfaces"]);
        assert_eq!(result["ips"][0]["address"], "10.0.0.2/24");
    }

    #[test]
    fn missing_previous_result() {
        let parsed = conf(&json!({ "cniVersion": "1.0.0", "vrfname": "blue" })).unwrap();
        assert_eq!(
            parsed.prev_result().unwrap_err().to_string(),
            "missing prevResult from earlier plugin"
        );
    }
}
