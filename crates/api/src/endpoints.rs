//! URL construction for the admin, pipeline and public delivery hosts.

use da_types::ResourceLocation;
use url::Url;

use crate::config::DaConfig;
use crate::error::DaError;

/// Resolves remote endpoints for a [`ResourceLocation`].
///
/// Path segments are percent-encoded individually, so a document named
/// `my page.html` is addressed as `my%20page.html`.
#[derive(Debug, Clone)]
pub struct Endpoints {
    admin_base: Url,
    pipeline_base: Url,
    git_ref: String,
    preview_domain: String,
    live_domain: String,
}

impl Endpoints {
    pub fn new(config: &DaConfig) -> Self {
        Self {
            admin_base: config.admin_base_url.clone(),
            pipeline_base: config.pipeline_base_url.clone(),
            git_ref: config.git_ref.clone(),
            preview_domain: config.preview_domain.clone(),
            live_domain: config.live_domain.clone(),
        }
    }

    /// `{admin}/source/{org}/{repo}/{path}`: read, create and delete.
    pub fn source(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        admin_url(&self.admin_base, "source", location)
    }

    /// `{admin}/list/{org}/{repo}/{path}`: folder listing; the path may be empty.
    pub fn list(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        admin_url(&self.admin_base, "list", location)
    }

    pub fn copy(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        admin_url(&self.admin_base, "copy", location)
    }

    pub fn move_to(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        admin_url(&self.admin_base, "move", location)
    }

    pub fn versions(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        admin_url(&self.admin_base, "versionlist", location)
    }

    /// `{pipeline}/preview/{org}/{repo}/{ref}/{path}`
    pub fn preview(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        pipeline_url(&self.pipeline_base, "preview", &self.git_ref, location)
    }

    /// `{pipeline}/live/{org}/{repo}/{ref}/{path}`
    pub fn publish(&self, location: &ResourceLocation) -> Result<Url, DaError> {
        pipeline_url(&self.pipeline_base, "live", &self.git_ref, location)
    }

    /// Public preview URL, e.g. `https://main--site--acme.aem.page/assets/img.png`.
    pub fn public_preview_url(&self, location: &ResourceLocation) -> String {
        public_url(&self.git_ref, &self.preview_domain, location)
    }

    /// Public live URL, e.g. `https://main--site--acme.aem.live/assets/img.png`.
    pub fn public_live_url(&self, location: &ResourceLocation) -> String {
        public_url(&self.git_ref, &self.live_domain, location)
    }
}

fn admin_url(base: &Url, route: &str, location: &ResourceLocation) -> Result<Url, DaError> {
    let segments = [route, location.org.as_str(), location.repo.as_str()]
        .into_iter()
        .chain(location.path_segments());
    join_segments(base, segments)
}

fn pipeline_url(base: &Url, route: &str, git_ref: &str, location: &ResourceLocation) -> Result<Url, DaError> {
    let segments = [route, location.org.as_str(), location.repo.as_str(), git_ref]
        .into_iter()
        .chain(location.path_segments());
    join_segments(base, segments)
}

fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, DaError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DaError::Url {
            base: base.to_string(),
            reason: "base URL cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn public_url(git_ref: &str, domain: &str, location: &ResourceLocation) -> String {
    let path = location.path_segments().collect::<Vec<_>>().join("/");
    format!("https://{git_ref}--{}--{}.{domain}/{path}", location.repo, location.org)
}
