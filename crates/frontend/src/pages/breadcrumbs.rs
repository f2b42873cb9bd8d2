use crate::context::AppContext;
use crate::routing::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub route: String,
}

/// Trail above the page shown for `route`: the doctype's module, then the
/// doctype's list when a form is open.
pub fn breadcrumbs_for(route: &Route, app: &AppContext) -> Vec<Breadcrumb> {
    let (Some(kind @ ("Form" | "List")), Some(doctype)) = (route.kind(), route.get(1)) else {
        return Vec::new();
    };
    let mut crumbs = Vec::new();
    if let Some(module) = app.meta.get(doctype).and_then(|m| m.module) {
        crumbs.push(Breadcrumb {
            label: app.translate(&module),
            route: Route::new(vec![app.config.router.modules_route.clone(), module]).to_route_string(),
        });
    }
    if kind == "Form" {
        crumbs.push(Breadcrumb {
            label: app.translate(doctype),
            route: Route::from(["List", doctype]).to_route_string(),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeskConfig;
    use crate::shared::storage::MemoryStorage;
    use contracts::shared::metadata::DocTypeMeta;
    use std::rc::Rc;

    #[test]
    fn test_form_trail_has_module_and_list() {
        let app = AppContext::new(DeskConfig::default(), Rc::new(MemoryStorage::new()));
        let mut meta = DocTypeMeta::new("Task", vec![]);
        meta.module = Some("Projects".into());
        app.meta.insert(meta);

        let crumbs = breadcrumbs_for(&Route::from(["Form", "Task", "T-1"]), &app);
        let routes: Vec<_> = crumbs.iter().map(|c| c.route.as_str()).collect();
        assert_eq!(routes, vec!["modules/Projects", "List/Task"]);

        assert_eq!(breadcrumbs_for(&Route::from(["List", "Task"]), &app).len(), 1);
        assert!(breadcrumbs_for(&Route::from(["home"]), &app).is_empty());
    }
}
