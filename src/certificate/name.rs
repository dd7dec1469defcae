//! Distinguished names
//!
//! Names keep every attribute in encounter order (repeated attribute types
//! such as several `OU` values are preserved) together with a canonical
//! RFC 4514 string. Issuer/subject matching compares the canonical strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use x509_parser::x509::X509Name;

/// A single attribute of a distinguished name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAttribute {
    /// Dotted OID of the attribute type
    pub oid: String,
    /// Long display name (`commonName`, `organizationName`, ...) or the dotted OID
    pub name: String,
    pub value: String,
}

/// Distinguished name as an ordered list of attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinguishedName {
    attributes: Vec<NameAttribute>,
    canonical: String,
}

impl DistinguishedName {
    /// Build from a parsed X.509 name
    pub(crate) fn from_x509(name: &X509Name<'_>) -> Self {
        let mut attributes = Vec::new();
        let mut rdn_strings = Vec::new();

        for rdn in name.iter() {
            let mut parts = Vec::new();
            for attr in rdn.iter() {
                let oid = attr.attr_type().to_id_string();
                let (value, escaped) = match attr.as_str() {
                    Ok(s) => (s.to_string(), escape_rfc4514(s)),
                    // Non-string values use the hex form of RFC 4514 section 2.4
                    Err(_) => {
                        let hex = format!("#{}", hex::encode(attr.attr_value().data));
                        (hex.clone(), hex)
                    }
                };
                parts.push(format!("{}={}", short_name(&oid), escaped));
                attributes.push(NameAttribute {
                    name: long_name(&oid),
                    oid,
                    value,
                });
            }
            rdn_strings.push(parts.join("+"));
        }

        // RFC 4514 lists RDNs from the last one encoded to the first
        rdn_strings.reverse();

        Self {
            attributes,
            canonical: rdn_strings.join(","),
        }
    }

    /// All attributes in encounter order
    pub fn attributes(&self) -> &[NameAttribute] {
        &self.attributes
    }

    /// Canonical RFC 4514 string used for issuer/subject comparison
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// All values for an attribute type given by long name
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.name == name)
            .map(|a| a.value.as_str())
            .collect()
    }

    /// First common name in encoding order
    pub fn common_name(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == "commonName")
            .map(|a| a.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

fn short_name(oid: &str) -> String {
    match oid {
        "2.5.4.3" => "CN",
        "2.5.4.7" => "L",
        "2.5.4.8" => "ST",
        "2.5.4.10" => "O",
        "2.5.4.11" => "OU",
        "2.5.4.6" => "C",
        "2.5.4.9" => "STREET",
        "0.9.2342.19200300.100.1.25" => "DC",
        "0.9.2342.19200300.100.1.1" => "UID",
        other => return other.to_string(),
    }
    .to_string()
}

fn long_name(oid: &str) -> String {
    match oid {
        "2.5.4.3" => "commonName",
        "2.5.4.4" => "surname",
        "2.5.4.5" => "serialNumber",
        "2.5.4.6" => "countryName",
        "2.5.4.7" => "localityName",
        "2.5.4.8" => "stateOrProvinceName",
        "2.5.4.9" => "streetAddress",
        "2.5.4.10" => "organizationName",
        "2.5.4.11" => "organizationalUnitName",
        "2.5.4.12" => "title",
        "2.5.4.15" => "businessCategory",
        "2.5.4.17" => "postalCode",
        "2.5.4.42" => "givenName",
        "2.5.4.97" => "organizationIdentifier",
        "1.2.840.113549.1.9.1" => "emailAddress",
        "0.9.2342.19200300.100.1.1" => "userID",
        "0.9.2342.19200300.100.1.25" => "domainComponent",
        "1.3.6.1.4.1.311.60.2.1.1" => "jurisdictionLocalityName",
        "1.3.6.1.4.1.311.60.2.1.2" => "jurisdictionStateOrProvinceName",
        "1.3.6.1.4.1.311.60.2.1.3" => "jurisdictionCountryName",
        other => return other.to_string(),
    }
    .to_string()
}

/// Escape an attribute value following RFC 4514 section 2.4
fn escape_rfc4514(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (i, c) in value.chars().enumerate() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }

    out
}
