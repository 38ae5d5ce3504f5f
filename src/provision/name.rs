//! Collision-free resource group naming.

use crate::azure::ResourceManager;
use crate::error::NameError;
use itertools::Itertools;
use reqwest::StatusCode;
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

/// Pick a name starting with `prefix` that is not in `existing`.
///
/// Returns `prefix` itself when it is free, otherwise `prefix` followed by the
/// smallest non-negative integer not already taken. Resource group names are
/// case-insensitive, so comparison ignores case.
///
/// # Examples
/// ```
/// use azure_nsg_provision::provision::allocate_name;
/// assert_eq!(allocate_name(["other"], "sample"), "sample");
/// assert_eq!(allocate_name(["sample", "sample0", "sample2"], "sample"), "sample1");
/// ```
pub fn allocate_name<I, S>(existing: I, prefix: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix_key = prefix.to_lowercase();
    let seen: BTreeSet<String> = existing
        .into_iter()
        .map(|name| name.as_ref().to_lowercase())
        .filter(|name| name.starts_with(&prefix_key))
        .collect();

    log::debug!(
        "existing names with prefix '{prefix}': [{}]",
        seen.iter().join(",")
    );

    if !seen.contains(&prefix_key) {
        return prefix.to_string();
    }

    // At most seen.len() candidates can be taken, so this ends within seen.len() + 1 steps.
    (0..=seen.len())
        .map(|i| format!("{prefix}{i}"))
        .find(|candidate| !seen.contains(&candidate.to_lowercase()))
        .unwrap_or_else(|| format!("{prefix}{}", seen.len()))
}

/// List the subscription's resource groups and allocate a free name.
///
/// # Returns
/// * `Ok(String)` - A name not used by any existing resource group
/// * `Err(NameError::Remote)` - The listing call failed, error passed through unchanged
/// * `Err(NameError::BadResponse)` - The listing answered without error but not with 200 OK
pub async fn unique_resource_group_name<M>(
    client: &M,
    prefix: &str,
    cancel: &CancellationToken,
) -> Result<String, NameError>
where
    M: ResourceManager + ?Sized,
{
    let listing = client.list_resource_groups(cancel).await?;
    if listing.status != StatusCode::OK {
        return Err(NameError::BadResponse(listing.status));
    }
    let name = allocate_name(&listing.body, prefix);
    log::info!(
        "allocated resource group name '{name}' ({} existing groups)",
        listing.body.len()
    );
    Ok(name)
}
