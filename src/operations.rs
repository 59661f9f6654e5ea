//! In-memory combine and split, independent of the filesystem.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    Error,
    namespace::{Filtered, qualify, unqualify, validate_module_name},
    types::ResourceDocument,
};

/// Entry counts for one module merged into the combined document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ModuleSummary {
    pub module: String,
    pub kept: usize,
    pub dropped: usize,
}

/// Appends the translatable entries of `document` to `aggregate`, keys prefixed
/// with `module`, each with the comment attached to it in `document`.
///
/// Fails on the first entry that cannot be processed; `aggregate` may then hold
/// part of the module and should be discarded.
pub fn combine_module(
    aggregate: &mut ResourceDocument,
    module: &str,
    document: &ResourceDocument,
) -> Result<ModuleSummary, Error> {
    validate_module_name(module)?;
    if document.namespaces.iter().any(|ns| ns.key == "xmlns") {
        log::warn!("Ignoring the default namespace declared by module {}", module);
    }
    aggregate.adopt_namespaces(&document.namespaces);

    let mut summary = ModuleSummary {
        module: module.to_string(),
        ..ModuleSummary::default()
    };
    for (index, entry, comment) in document.entries_with_comments() {
        match qualify(entry, module, index)? {
            Filtered::Keep(qualified) => {
                aggregate.append_with_comment(qualified, comment)?;
                summary.kept += 1;
            }
            Filtered::Drop(reason) => {
                log::debug!(
                    "Skipping {} entry #{} `{}`: {}",
                    module,
                    index,
                    entry.key().unwrap_or_default(),
                    reason
                );
                summary.dropped += 1;
            }
        }
    }

    if !aggregate.is_empty() {
        aggregate.mark_section_end();
    }
    Ok(summary)
}

/// Combines module documents, in the given order, into one aggregate document.
pub fn combine_documents<'a, I>(modules: I) -> Result<(ResourceDocument, Vec<ModuleSummary>), Error>
where
    I: IntoIterator<Item = (&'a str, &'a ResourceDocument)>,
{
    let mut aggregate = ResourceDocument::new();
    let mut summaries = Vec::new();
    for (module, document) in modules {
        let summary =
            combine_module(&mut aggregate, module, document).map_err(|e| e.in_module(module))?;
        summaries.push(summary);
    }
    Ok((aggregate, summaries))
}

/// Splits an aggregate document into one document per module, keys stripped of
/// their module prefix. Comments that precede an entry travel with it; other
/// comments are dropped.
pub fn split_document(aggregate: &ResourceDocument) -> Result<BTreeMap<String, ResourceDocument>, Error> {
    let mut modules: BTreeMap<String, ResourceDocument> = BTreeMap::new();
    for (index, entry, comment) in aggregate.entries_with_comments() {
        let (module, stripped) = unqualify(entry, index)?;
        let destination = modules.entry(module).or_insert_with(|| {
            let mut document = ResourceDocument::new();
            document.root = aggregate.root.clone();
            document.namespaces = aggregate.namespaces.clone();
            document
        });
        destination.append_with_comment(stripped, comment)?;
    }
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        traits::Parser,
        types::{Node, Spacing},
    };
    use indoc::indoc;

    fn doc(xml: &str) -> ResourceDocument {
        ResourceDocument::from_str(xml).unwrap()
    }

    fn keys(document: &ResourceDocument) -> Vec<String> {
        document
            .entries()
            .map(|e| e.key().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_combine_scenario() {
        let auth = doc(r#"<resources><string name="login_title">Log in</string></resources>"#);
        let payments = doc(indoc! {r#"
            <resources>
                <string name="fee_label">Fee</string>
                <string name="internal_debug" translatable="false">debug</string>
            </resources>
        "#});

        let (aggregate, summaries) =
            combine_documents([("auth", &auth), ("payments", &payments)]).unwrap();
        assert_eq!(keys(&aggregate), vec!["auth.login_title", "payments.fee_label"]);
        assert_eq!(summaries[1].kept, 1);
        assert_eq!(summaries[1].dropped, 1);
    }

    #[test]
    fn test_combine_carries_only_attached_comments() {
        let module = doc(indoc! {r#"
            <resources>
                <!-- Title shown on the sign-in screen -->
                <string name="title">Sign in</string>
                <!-- dropped together with its entry -->
                <color name="accent">#fff</color>
                <!-- orphan, not followed by an entry -->
                <!-- Error banner -->
                <string name="error">Oops</string>
                <string name="retry">Retry</string>
            </resources>
        "#});

        let (aggregate, _) = combine_documents([("auth", &module)]).unwrap();
        let nodes: Vec<_> = aggregate.nodes().collect();
        assert_eq!(nodes.len(), 5);
        assert!(matches!(nodes[0], Node::Comment(c) if c.text == " Title shown on the sign-in screen "));
        assert!(matches!(nodes[1], Node::Entry(e) if e.key() == Some("auth.title")));
        assert!(matches!(nodes[2], Node::Comment(c) if c.text == " Error banner "));
        assert!(matches!(nodes[3], Node::Entry(e) if e.key() == Some("auth.error")));
        assert!(matches!(nodes[4], Node::Entry(e) if e.key() == Some("auth.retry")));
    }

    #[test]
    fn test_combine_separates_modules() {
        let a = doc(r#"<resources><string name="x">X</string><string name="y">Y</string></resources>"#);
        let b = doc(r#"<resources><string name="z">Z</string></resources>"#);
        let (aggregate, _) = combine_documents([("a", &a), ("b", &b)]).unwrap();
        let tails: Vec<_> = aggregate.children.iter().map(|c| c.tail).collect();
        assert_eq!(tails, vec![Spacing::Indent, Spacing::Blank, Spacing::Blank]);
    }

    #[test]
    fn test_combine_preserves_order_within_module() {
        let a = doc(r#"<resources><string name="c">3</string><string name="a">1</string><string name="b">2</string></resources>"#);
        let (aggregate, _) = combine_documents([("m", &a)]).unwrap();
        assert_eq!(keys(&aggregate), vec!["m.c", "m.a", "m.b"]);
    }

    #[test]
    fn test_combine_adopts_namespaces() {
        let a = doc(r#"<resources xmlns:tools="http://schemas.android.com/tools"><string name="x" tools:ignore="Typos">x</string><string name="y">y</string></resources>"#);
        let (aggregate, summaries) = combine_documents([("a", &a)]).unwrap();
        assert_eq!(keys(&aggregate), vec!["a.y"]);
        assert_eq!(summaries[0].dropped, 1);
        assert_eq!(
            aggregate.namespace_uri("tools"),
            Some("http://schemas.android.com/tools")
        );
    }

    #[test]
    fn test_combine_ignores_default_namespace() {
        let a = doc(r#"<resources xmlns="urn:x"><string name="x">X</string></resources>"#);
        let b = doc(r#"<resources xmlns:tools="http://schemas.android.com/tools"><string name="y">Y</string></resources>"#);
        let (aggregate, _) = combine_documents([("a", &a), ("b", &b)]).unwrap();
        assert_eq!(keys(&aggregate), vec!["a.x", "b.y"]);
        let mut out = Vec::new();
        aggregate.to_writer(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(r#"<resources xmlns:tools="http://schemas.android.com/tools">"#));
        assert!(!out.contains("urn:x"));
    }

    #[test]
    fn test_combine_rejects_dotted_module() {
        let a = doc(r#"<resources><string name="x">X</string></resources>"#);
        let err = combine_documents([("com.app", &a)]).unwrap_err();
        assert!(matches!(err.root_cause(), Error::InvalidModuleName(_)));
    }

    #[test]
    fn test_combine_missing_name_reports_module_and_index() {
        let a = doc(r#"<resources><string name="x">X</string><!-- c --><string>nameless</string></resources>"#);
        let err = combine_documents([("auth", &a)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "module `auth`: entry #3: missing required attribute `name`"
        );
    }

    #[test]
    fn test_split_buckets_by_module() {
        let aggregate = doc(indoc! {r#"
            <resources>
                <!-- Sign in -->
                <string name="auth.login_title">Connexion</string>
                <string name="payments.fee_label">Frais</string>

                <string name="auth.logout">Déconnexion</string>
            </resources>
        "#});
        let modules = split_document(&aggregate).unwrap();
        assert_eq!(modules.len(), 2);
        let auth = &modules["auth"];
        assert_eq!(keys(auth), vec!["login_title", "logout"]);
        assert_eq!(auth.attached_comment(1).unwrap().text, " Sign in ");
        assert_eq!(keys(&modules["payments"]), vec!["fee_label"]);
        assert!(modules["payments"].comments().next().is_none());
    }

    #[test]
    fn test_split_malformed_key_aborts() {
        let aggregate = doc(r#"<resources><string name="auth.a">A</string><string name="orphan">B</string></resources>"#);
        assert!(matches!(
            split_document(&aggregate),
            Err(Error::MalformedKey { index: 2, .. })
        ));
    }

    #[test]
    fn test_split_keeps_all_element_kinds() {
        let aggregate = doc(r#"<resources><string-array name="core.days"><item>Mon</item></string-array><plurals name="core.items"><item quantity="one">1 item</item></plurals></resources>"#);
        let modules = split_document(&aggregate).unwrap();
        assert_eq!(keys(&modules["core"]), vec!["days", "items"]);
    }

    #[test]
    fn test_split_inverts_combine() {
        let auth = doc(r#"<resources><!-- a --><string name="x.y">X</string><string name="z">Z</string></resources>"#);
        let core = doc(r#"<resources><plurals name="n"><item quantity="other">%d</item></plurals></resources>"#);
        let (aggregate, _) = combine_documents([("auth", &auth), ("core", &core)]).unwrap();
        let modules = split_document(&aggregate).unwrap();
        assert_eq!(modules["auth"].nodes().collect::<Vec<_>>(), auth.nodes().collect::<Vec<_>>());
        assert_eq!(modules["core"].nodes().collect::<Vec<_>>(), core.nodes().collect::<Vec<_>>());
    }
}
