//! Pages: the container of cached pages and the views that fill them

pub mod breadcrumbs;
pub mod container;
pub mod factory;
pub mod form_factory;
pub mod host;
pub mod list_factory;
pub mod page_view;

pub use breadcrumbs::{breadcrumbs_for, Breadcrumb};
pub use container::{ContainerEvent, Page, PageContainer, PageContent, PageId, PageSignal};
pub use factory::{make_page, FactoryRegistry, ViewCx, ViewError, ViewFactory};
pub use form_factory::{FormFactory, FormPage};
pub use host::PageHost;
pub use list_factory::{ListFactory, ListPage};
pub use page_view::PageView;
