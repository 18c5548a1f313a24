//! Release publishing with replace-on-conflict semantics.
//!
//! Publishing is a strict ordered pipeline:
//!
//! 1. resolve the repository from the git remote,
//! 2. look up the release by tag,
//! 3. delete any asset already carrying the artefact's name,
//! 4. upload the artefact.
//!
//! Each stage aborts the rest on failure, with one exception: if the asset
//! list cannot be fetched, the upload still goes ahead as though no
//! conflicting asset exists. A failed delete is always fatal, so a release
//! never ends up with two assets of the same name.

use crate::error::{PublisherError, Result};
use crate::git::RemoteUrlSource;
use crate::github::{Asset, Release, ReleaseApi};
use crate::naming::ArtefactName;
use crate::output::write_line;
use crate::repo_id::RepoIdentifier;
use camino::Utf8Path;
use std::io::Write;

/// One artefact to publish.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    /// Tag of the target release.
    pub tag: &'a str,
    /// Local path of the built binary.
    pub file: &'a Utf8Path,
    /// Asset name to publish under.
    pub artefact_name: &'a ArtefactName,
}

/// Run the whole pipeline for a single artefact.
///
/// Progress lines are written to `progress`.
///
/// # Errors
///
/// Returns the error of the first stage that fails; see
/// [`resolve_repository`] and [`publish_to`].
pub fn publish(
    api: &dyn ReleaseApi,
    remote: &dyn RemoteUrlSource,
    request: &PublishRequest<'_>,
    progress: &mut dyn Write,
) -> Result<Asset> {
    let repo = resolve_repository(remote, progress)?;
    publish_to(api, &repo, request, progress)
}

/// Stage 1: derive the release repository from the git remote.
///
/// # Errors
///
/// Returns [`PublisherError::RepoResolution`] if git cannot report the
/// remote URL or the URL has no `owner/repo` part.
pub fn resolve_repository(
    remote: &dyn RemoteUrlSource,
    progress: &mut dyn Write,
) -> Result<RepoIdentifier> {
    let resolved = remote
        .fetch_url()
        .and_then(|url| RepoIdentifier::resolve(&url));

    match resolved {
        Ok(repo) => {
            write_line(progress, format!("Publishing to repository {repo}"));
            Ok(repo)
        }
        Err(err) => Err(PublisherError::RepoResolution {
            reason: err.to_string(),
        }),
    }
}

/// Stages 2 to 4: find the release, clear any conflicting asset, upload.
///
/// # Errors
///
/// - [`PublisherError::ReleaseNotFound`] if the tag lookup fails; no other
///   API call is made.
/// - [`PublisherError::Io`] if the artefact cannot be read.
/// - [`PublisherError::AssetDeletionFailed`] if a same-named asset cannot
///   be removed; nothing is uploaded.
/// - [`PublisherError::UploadFailed`] if the upload fails.
pub fn publish_to(
    api: &dyn ReleaseApi,
    repo: &RepoIdentifier,
    request: &PublishRequest<'_>,
    progress: &mut dyn Write,
) -> Result<Asset> {
    let release = find_release(api, repo, request.tag, progress)?;

    // Read before touching the release so a missing binary never costs the
    // previously published asset.
    let body = std::fs::read(request.file.as_std_path())?;

    remove_conflicting_assets(api, repo, &release, request.artefact_name, progress)?;
    upload(api, repo, &release, request, &body, progress)
}

fn find_release(
    api: &dyn ReleaseApi,
    repo: &RepoIdentifier,
    tag: &str,
    progress: &mut dyn Write,
) -> Result<Release> {
    let release = api
        .release_by_tag(repo, tag)
        .map_err(|err| PublisherError::ReleaseNotFound {
            tag: tag.to_owned(),
            reason: err.to_string(),
        })?;
    write_line(
        progress,
        format!("Found release {} for tag {tag}", release.id),
    );
    Ok(release)
}

fn remove_conflicting_assets(
    api: &dyn ReleaseApi,
    repo: &RepoIdentifier,
    release: &Release,
    name: &ArtefactName,
    progress: &mut dyn Write,
) -> Result<()> {
    let assets = match api.list_assets(repo, release.id) {
        Ok(assets) => assets,
        Err(err) => {
            log::warn!("cannot list assets of release {}: {err}", release.id);
            return Ok(());
        }
    };

    for asset in assets.iter().filter(|a| a.name == name.as_str()) {
        write_line(
            progress,
            format!("Deleting existing asset '{name}' (id {})", asset.id),
        );
        api.delete_asset(repo, asset.id)
            .map_err(|err| PublisherError::AssetDeletionFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
    }

    Ok(())
}

fn upload(
    api: &dyn ReleaseApi,
    repo: &RepoIdentifier,
    release: &Release,
    request: &PublishRequest<'_>,
    body: &[u8],
    progress: &mut dyn Write,
) -> Result<Asset> {
    let name = request.artefact_name;
    let asset = api
        .upload_asset(repo, release.id, name.as_str(), body)
        .map_err(|err| PublisherError::UploadFailed {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
    write_line(
        progress,
        format!("Uploaded asset '{name}' to release '{}'", request.tag),
    );
    Ok(asset)
}

#[cfg(test)]
#[path = "publish_tests.rs"]
mod tests;
