//! Legacy XML descriptor support.
//!
//! Packages predating the YAML linkspec carry a `package.linkspec` XML
//! file:
//!
//! ```xml
//! <link name="lib-a" useChildPackageLinks="true">
//!   <childPackageLinks>
//!     <link package="lib-a-child0"/>
//!   </childPackageLinks>
//!   <externalPackageLinks>
//!     <link package="ref:shared.resources" path="resources"/>
//!   </externalPackageLinks>
//! </link>
//! ```
//!
//! [`transform`] is a pure function from that document to a [`LinkSpec`],
//! deliberately isolated from the YAML loading path so the two formats
//! can be tested independently and this one retired without touching the
//! engine.

use std::path::Path;

use thiserror::Error;

use super::linkspec::LinkSpec;
use super::{ExternalLinkDeclaration, LinkDeclaration};
use crate::error::LinkspecError;

/// Failures specific to the legacy XML schema.
#[derive(Error, Debug)]
pub enum LegacyXmlError {
    /// The document is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    /// The document root is not a `<link>` element.
    #[error("missing <link> root element")]
    MissingRoot,

    /// A `<link>` entry lacks a required attribute.
    #[error("<link> element in <{section}> is missing the \"{attribute}\" attribute")]
    MissingAttribute {
        /// Section element the entry appeared in.
        section: &'static str,
        /// The absent attribute.
        attribute: &'static str,
    },
}

impl LegacyXmlError {
    /// Attach the descriptor path, lifting into the shared taxonomy.
    pub(super) fn into_linkspec_error(self, path: &Path) -> LinkspecError {
        match self {
            Self::Xml(source) => LinkspecError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            },
            other => LinkspecError::Invalid {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

/// Transform a legacy XML descriptor into the canonical [`LinkSpec`] shape.
///
/// - each `<childPackageLinks>` entry becomes a child [`LinkDeclaration`]
///   whose target is the `__default__` anchor joined with the child's
///   package name (child links are only honored when the
///   `useChildPackageLinks` flag is set);
/// - each `<externalPackageLinks>` entry becomes an
///   [`ExternalLinkDeclaration`] whose source is a template placeholder
///   derived from the package reference (`ref:` prefix stripped, `.`
///   replaced by `_`) and whose target is the entry's `path`.
///
/// # Errors
///
/// Returns [`LegacyXmlError`] on malformed XML or schema violations.
pub fn transform(xml: &str) -> Result<LinkSpec, LegacyXmlError> {
    let document = roxmltree::Document::parse(xml)?;
    let root = document.root_element();
    if root.tag_name().name() != "link" {
        return Err(LegacyXmlError::MissingRoot);
    }

    let mut spec = LinkSpec {
        name: root.attribute("name").map(str::to_string),
        ..LinkSpec::default()
    };

    if truthy(root.attribute("useChildPackageLinks").unwrap_or(""))
        && let Some(section) = element_child(root, "childPackageLinks")
    {
        let mut links = Vec::new();
        for entry in link_entries(section) {
            let package = entry
                .attribute("package")
                .ok_or(LegacyXmlError::MissingAttribute {
                    section: "childPackageLinks",
                    attribute: "package",
                })?;
            links.push(LinkDeclaration {
                source: Some(package.to_string()),
                target: Some(format!("{{{{__default__}}}}/{package}")),
                ..LinkDeclaration::default()
            });
        }
        if !links.is_empty() {
            spec.links = Some(links);
        }
    }

    if let Some(section) = element_child(root, "externalPackageLinks") {
        let mut externals = Vec::new();
        for entry in link_entries(section) {
            let package = entry
                .attribute("package")
                .ok_or(LegacyXmlError::MissingAttribute {
                    section: "externalPackageLinks",
                    attribute: "package",
                })?;
            let path = entry
                .attribute("path")
                .ok_or(LegacyXmlError::MissingAttribute {
                    section: "externalPackageLinks",
                    attribute: "path",
                })?;
            externals.push(ExternalLinkDeclaration {
                source: format!("{{{{{}}}}}", placeholder(package)),
                target: path.to_string(),
                default_content: None,
            });
        }
        if !externals.is_empty() {
            spec.external_links = Some(externals);
        }
    }

    Ok(spec)
}

/// The legacy flag treats anything outside `false`/`no`/`False`/empty as set.
fn truthy(value: &str) -> bool {
    !matches!(value, "false" | "no" | "False" | "")
}

/// Derive the template parameter name for an external package reference.
fn placeholder(package: &str) -> String {
    package.strip_prefix("ref:").unwrap_or(package).replace('.', "_")
}

fn element_child<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn link_entries<'a>(
    section: roxmltree::Node<'a, 'a>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "link")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn transforms_child_links_to_default_anchor_targets() {
        let spec = transform(
            r#"<link name="lib-a" useChildPackageLinks="true">
                 <childPackageLinks>
                   <link package="lib-a-child0"/>
                   <link package="lib-a-child1"/>
                 </childPackageLinks>
               </link>"#,
        )
        .unwrap();

        assert_eq!(spec.name.as_deref(), Some("lib-a"));
        let links = spec.links.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].source.as_deref(), Some("lib-a-child0"));
        assert_eq!(
            links[0].target.as_deref(),
            Some("{{__default__}}/lib-a-child0")
        );
        assert_eq!(
            links[1].target.as_deref(),
            Some("{{__default__}}/lib-a-child1")
        );
    }

    #[test]
    fn child_links_are_ignored_when_flag_is_false() {
        let spec = transform(
            r#"<link name="lib-a" useChildPackageLinks="false">
                 <childPackageLinks>
                   <link package="lib-a-child0"/>
                 </childPackageLinks>
               </link>"#,
        )
        .unwrap();
        assert!(spec.links.is_none());
    }

    #[test]
    fn child_links_are_ignored_when_flag_is_absent() {
        let spec = transform(
            r#"<link name="lib-a">
                 <childPackageLinks>
                   <link package="lib-a-child0"/>
                 </childPackageLinks>
               </link>"#,
        )
        .unwrap();
        assert!(spec.links.is_none());
    }

    #[test]
    fn external_links_strip_ref_prefix_and_dots() {
        let spec = transform(
            r#"<link name="lib-a">
                 <externalPackageLinks>
                   <link package="ref:shared.resources" path="resources"/>
                 </externalPackageLinks>
               </link>"#,
        )
        .unwrap();

        let externals = spec.external_links.unwrap();
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].source, "{{shared_resources}}");
        assert_eq!(externals[0].target, "resources");
        assert!(externals[0].default_content.is_none());
    }

    #[test]
    fn external_link_without_path_is_invalid() {
        let err = transform(
            r#"<link>
                 <externalPackageLinks>
                   <link package="ref:x"/>
                 </externalPackageLinks>
               </link>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LegacyXmlError::MissingAttribute {
                attribute: "path",
                ..
            }
        ));
    }

    #[test]
    fn child_link_without_package_is_invalid() {
        let err = transform(
            r#"<link useChildPackageLinks="yes">
                 <childPackageLinks><link/></childPackageLinks>
               </link>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LegacyXmlError::MissingAttribute {
                attribute: "package",
                ..
            }
        ));
    }

    #[test]
    fn wrong_root_element_is_rejected() {
        let err = transform("<package/>").unwrap_err();
        assert!(matches!(err, LegacyXmlError::MissingRoot));
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = transform("<link>").unwrap_err();
        assert!(matches!(err, LegacyXmlError::Xml(_)));
    }

    #[test]
    fn placeholder_keeps_inner_ref_text() {
        assert_eq!(placeholder("ref:a.b.c"), "a_b_c");
        assert_eq!(placeholder("plain"), "plain");
    }
}
