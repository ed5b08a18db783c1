//! Assembly identity for cross-boundary references.
//!
//! Every reference that leaves the module being emitted carries the identity
//! of the assembly it points into: simple name, four-part version, culture,
//! public-key token, content type, and the retargetable flag. This module
//! provides that identity record together with display-name parsing and
//! formatting in the conventional
//! `Name, Version=1.2.3.4, Culture=neutral, PublicKeyToken=b77a5c561934e089`
//! shape.
//!
//! # Identity Components
//!
//! Assemblies are uniquely identified by the combination of:
//! - **Simple Name**: The primary assembly name (e.g. "mscorlib")
//! - **Version**: Four-part version number for binding decisions
//! - **Culture**: Localization culture (None for culture-neutral assemblies)
//! - **Public Key Token**: 8-byte strong-name token, if strong named
//! - **Content Type**: default vs. Windows Runtime metadata
//!
//! # Examples
//!
//! ```rust
//! use cilemit::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//!
//! let identity = AssemblyIdentity::parse(
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
//! )?;
//! assert_eq!(identity.simple_name(), "mscorlib");
//! assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
//! assert!(identity.is_strong_named());
//! # Ok::<(), cilemit::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`] and can be used as keys
//! in concurrent collections.

use std::{fmt, fmt::Write as _, str::FromStr};

use crate::{Error, Result};

/// Four-part assembly version (major.minor.build.revision).
///
/// Each component is a 16-bit value, following the binding convention of the
/// metadata format's Assembly and AssemblyRef tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AssemblyVersion {
    /// Major version component
    pub major: u16,
    /// Minor version component
    pub minor: u16,
    /// Build number component
    pub build: u16,
    /// Revision number component
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a new version from its four components
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses a dotted version string (`"1.2.3.4"`).
    ///
    /// Trailing components may be omitted and default to zero, so `"4.0"`
    /// parses as `4.0.0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if any component is not a valid
    /// 16-bit integer or more than four components are present.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(Error::InvalidIdentity {
                message: format!("version '{version_str}' must have 1 to 4 components"),
            });
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = u16::from_str(part.trim()).map_err(|_| Error::InvalidIdentity {
                message: format!("invalid version component '{part}' in '{version_str}'"),
            })?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }

    /// Returns true if this version can satisfy a binding against `required`.
    ///
    /// Major and minor components must match exactly; build and revision may
    /// be equal or newer.
    #[must_use]
    pub fn is_compatible_with(&self, required: &AssemblyVersion) -> bool {
        self.major == required.major
            && self.minor == required.minor
            && (self.build, self.revision) >= (required.build, required.revision)
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Content type of an assembly, from the identity flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssemblyContentType {
    /// Ordinary CLI assembly
    #[default]
    Default,
    /// Windows Runtime metadata assembly
    WindowsRuntime,
}

/// Complete identity of an assembly as carried on assembly references.
///
/// This is the record the table writer serializes into AssemblyRef rows:
/// name, version, culture, public-key token, content type, and the
/// retargetable flag.
///
/// # Equality Semantics
///
/// All fields participate in equality and hashing; two identities are
/// interchangeable for reference purposes exactly when they are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple assembly name (without extension)
    pub name: String,
    /// Four-part assembly version
    pub version: AssemblyVersion,
    /// Culture for localized assemblies, `None` when culture-neutral
    pub culture: Option<String>,
    /// 8-byte public-key token for strong-named assemblies
    pub public_key_token: Option<[u8; 8]>,
    /// Content type (default vs. Windows Runtime)
    pub content_type: AssemblyContentType,
    /// Whether the reference may be retargeted to another publisher's build
    pub is_retargetable: bool,
}

impl AssemblyIdentity {
    /// Creates a new assembly identity.
    ///
    /// # Arguments
    ///
    /// * `name` - Simple assembly name
    /// * `version` - Four-part version
    /// * `culture` - Culture name, or `None` for culture-neutral
    /// * `public_key_token` - Strong-name token, if strong named
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: AssemblyVersion,
        culture: Option<String>,
        public_key_token: Option<[u8; 8]>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            culture,
            public_key_token,
            content_type: AssemblyContentType::Default,
            is_retargetable: false,
        }
    }

    /// Marks the identity as retargetable.
    #[must_use]
    pub fn with_retargetable(mut self) -> Self {
        self.is_retargetable = true;
        self
    }

    /// Sets the content type of the identity.
    #[must_use]
    pub fn with_content_type(mut self, content_type: AssemblyContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Parses a display name of the form
    /// `Name, Version=1.2.3.4, Culture=neutral, PublicKeyToken=abcdef0123456789`.
    ///
    /// Only the name part is mandatory; unknown `Key=Value` pairs are
    /// rejected. `Culture=neutral` and `PublicKeyToken=null` map to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] for an empty name, malformed
    /// components, or unknown keys.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',');

        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::InvalidIdentity {
                message: "display name has no assembly name".to_string(),
            })?;

        let mut identity = AssemblyIdentity::new(name, AssemblyVersion::default(), None, None);

        for part in parts {
            let (key, value) = part.split_once('=').ok_or_else(|| Error::InvalidIdentity {
                message: format!("component '{}' is not Key=Value", part.trim()),
            })?;

            match key.trim().to_ascii_lowercase().as_str() {
                "version" => identity.version = AssemblyVersion::parse(value.trim())?,
                "culture" | "language" => {
                    let culture = value.trim();
                    identity.culture = if culture.eq_ignore_ascii_case("neutral") {
                        None
                    } else {
                        Some(culture.to_string())
                    };
                }
                "publickeytoken" => {
                    let token = value.trim();
                    identity.public_key_token = if token.eq_ignore_ascii_case("null") {
                        None
                    } else {
                        Some(Self::parse_token(token)?)
                    };
                }
                "contenttype" => {
                    identity.content_type = if value.trim().eq_ignore_ascii_case("windowsruntime")
                    {
                        AssemblyContentType::WindowsRuntime
                    } else {
                        AssemblyContentType::Default
                    };
                }
                "retargetable" => {
                    identity.is_retargetable = value.trim().eq_ignore_ascii_case("yes");
                }
                other => {
                    return Err(Error::InvalidIdentity {
                        message: format!("unknown display name component '{other}'"),
                    });
                }
            }
        }

        Ok(identity)
    }

    fn parse_token(hex: &str) -> Result<[u8; 8]> {
        if hex.len() != 16 {
            return Err(Error::InvalidIdentity {
                message: format!("public key token '{hex}' must be 16 hex digits"),
            });
        }

        let mut token = [0u8; 8];
        for (i, byte) in token.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
                Error::InvalidIdentity {
                    message: format!("public key token '{hex}' contains non-hex digits"),
                }
            })?;
        }
        Ok(token)
    }

    /// Formats the canonical display name for this identity.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 64);
        out.push_str(&self.name);
        let _ = write!(out, ", Version={}", self.version);
        let _ = write!(
            out,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );

        match &self.public_key_token {
            Some(token) => {
                out.push_str(", PublicKeyToken=");
                for byte in token {
                    let _ = write!(out, "{byte:02x}");
                }
            }
            None => out.push_str(", PublicKeyToken=null"),
        }

        if self.content_type == AssemblyContentType::WindowsRuntime {
            out.push_str(", ContentType=WindowsRuntime");
        }
        if self.is_retargetable {
            out.push_str(", Retargetable=Yes");
        }

        out
    }

    /// Returns the simple assembly name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Returns true if the assembly carries a strong-name token.
    #[must_use]
    pub fn is_strong_named(&self) -> bool {
        self.public_key_token.is_some()
    }

    /// Returns true if the assembly is culture-neutral.
    #[must_use]
    pub fn is_culture_neutral(&self) -> bool {
        self.culture.is_none()
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_full() {
        let version = AssemblyVersion::parse("1.2.3.4").unwrap();
        assert_eq!(version, AssemblyVersion::new(1, 2, 3, 4));
    }

    #[test]
    fn test_version_parse_partial() {
        let version = AssemblyVersion::parse("4.0").unwrap();
        assert_eq!(version, AssemblyVersion::new(4, 0, 0, 0));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(AssemblyVersion::parse("1.2.x.4").is_err());
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
        assert!(AssemblyVersion::parse("70000").is_err());
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = AssemblyVersion::new(4, 0, 1, 0);
        let v2 = AssemblyVersion::new(4, 0, 0, 5);
        assert!(v1.is_compatible_with(&v2));
        assert!(!v2.is_compatible_with(&v1));
        assert!(!AssemblyVersion::new(4, 1, 0, 0).is_compatible_with(&v2));
    }

    #[test]
    fn test_version_ordering() {
        assert!(AssemblyVersion::new(1, 0, 0, 0) < AssemblyVersion::new(1, 0, 0, 1));
        assert!(AssemblyVersion::new(1, 9, 0, 0) < AssemblyVersion::new(2, 0, 0, 0));
    }

    #[test]
    fn test_identity_parse_strong_named() {
        let identity = AssemblyIdentity::parse(
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();

        assert_eq!(identity.simple_name(), "mscorlib");
        assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert!(identity.is_culture_neutral());
        assert!(identity.is_strong_named());
        assert_eq!(
            identity.public_key_token,
            Some([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89])
        );
    }

    #[test]
    fn test_identity_parse_simple() {
        let identity = AssemblyIdentity::parse("MyLibrary").unwrap();
        assert_eq!(identity.simple_name(), "MyLibrary");
        assert_eq!(identity.version, AssemblyVersion::default());
        assert!(!identity.is_strong_named());
    }

    #[test]
    fn test_identity_parse_culture() {
        let identity =
            AssemblyIdentity::parse("Resources, Version=1.0.0.0, Culture=de-DE").unwrap();
        assert_eq!(identity.culture.as_deref(), Some("de-DE"));
        assert!(!identity.is_culture_neutral());
    }

    #[test]
    fn test_identity_parse_retargetable() {
        let identity =
            AssemblyIdentity::parse("System, Version=2.0.5.0, Retargetable=Yes").unwrap();
        assert!(identity.is_retargetable);
    }

    #[test]
    fn test_identity_parse_rejects_unknown_key() {
        assert!(AssemblyIdentity::parse("System, Flavor=Strange").is_err());
        assert!(AssemblyIdentity::parse("").is_err());
        assert!(AssemblyIdentity::parse("System, Version").is_err());
    }

    #[test]
    fn test_identity_display_name_roundtrip() {
        let original = AssemblyIdentity::new(
            "System.Core",
            AssemblyVersion::new(3, 5, 0, 0),
            None,
            Some([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]),
        );

        let display = original.display_name();
        assert_eq!(
            display,
            "System.Core, Version=3.5.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
        );

        let parsed = AssemblyIdentity::parse(&display).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_identity_equality_covers_all_fields() {
        let a = AssemblyIdentity::new("A", AssemblyVersion::new(1, 0, 0, 0), None, None);
        let b = a.clone().with_retargetable();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_token_length() {
        assert!(AssemblyIdentity::parse("A, PublicKeyToken=b77a5c").is_err());
        assert!(AssemblyIdentity::parse("A, PublicKeyToken=zz7a5c561934e089").is_err());
    }
}
