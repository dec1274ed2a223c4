use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Category selection: which corpus folders become classes
// ---------------------------------------------------------------------------

/// Allow-list of category names. `None` means "every category".
pub type CategorySelection = Option<BTreeSet<String>>;

/// Build a selection from an optional list of names.
pub fn selection_from(categories: Option<&[String]>) -> CategorySelection {
    categories.map(|names| names.iter().cloned().collect())
}

/// Whether a folder passes the selection:
/// * there is no selection → passes (no constraint)
/// * the selection is empty → nothing allowed → fails
/// * the folder name is in the selection → passes
pub fn is_selected(name: &str, selection: &CategorySelection) -> bool {
    match selection {
        None => true,
        Some(allowed) => allowed.contains(name),
    }
}

/// Keep the folders that pass the selection, in their given order.
pub fn selected_categories(folders: Vec<String>, selection: &CategorySelection) -> Vec<String> {
    folders
        .into_iter()
        .filter(|name| is_selected(name, selection))
        .collect()
}

/// Names in the selection that match no folder. These are ignored, not
/// treated as errors.
pub fn unmatched_categories<'a>(
    folders: &[String],
    selection: &'a CategorySelection,
) -> Vec<&'a str> {
    match selection {
        None => Vec::new(),
        Some(allowed) => allowed
            .iter()
            .filter(|name| !folders.contains(name))
            .map(String::as_str)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folders() -> Vec<String> {
        ["alt.atheism", "comp.graphics", "sci.space"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn no_selection_keeps_all() {
        assert_eq!(selected_categories(folders(), &None), folders());
    }

    #[test]
    fn selection_preserves_folder_order() {
        let wanted = vec!["sci.space".to_string(), "alt.atheism".to_string()];
        let selection = selection_from(Some(wanted.as_slice()));
        assert_eq!(
            selected_categories(folders(), &selection),
            vec!["alt.atheism", "sci.space"]
        );
    }

    #[test]
    fn empty_selection_keeps_nothing() {
        let selection = selection_from(Some(&[] as &[String]));
        assert!(selected_categories(folders(), &selection).is_empty());
    }

    #[test]
    fn unknown_names_are_reported_not_kept() {
        let wanted = vec!["sci.space".to_string(), "rec.autos".to_string()];
        let selection = selection_from(Some(wanted.as_slice()));
        assert_eq!(selected_categories(folders(), &selection), vec!["sci.space"]);
        assert_eq!(unmatched_categories(&folders(), &selection), vec!["rec.autos"]);
    }
}
