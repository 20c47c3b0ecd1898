//! Roster reconciliation: keep stored user records in step with the
//! thread's participant list.

use tracing::{debug, info};

use {
    chronicle_platform::PlatformClient,
    chronicle_store::{MessageStore, User},
};

use crate::error::{Error, Result};

/// Diff platform participants against stored ids; when anyone is missing,
/// refresh every participant's profile. Profile fields are overwritten,
/// while privilege, last-read and plugin state survive (see
/// [`MessageStore::upsert_user`]). Returns how many records were written.
pub async fn reconcile_roster(
    client: &dyn PlatformClient,
    store: &dyn MessageStore,
    thread_id: &str,
) -> Result<usize> {
    let participants = client.fetch_participants(thread_id).await?;
    let known = store.user_ids().await.map_err(Error::Store)?;

    if participants.is_subset(&known) {
        debug!(thread_id, "roster already up to date");
        return Ok(0);
    }

    let mut written = 0;
    for id in &participants {
        let profile = client.fetch_user_profile(id).await?;
        let mut user = User::new(profile.id, profile.display_name);
        user.nickname = profile.nickname;
        user.profile_image = profile.profile_image;
        store.upsert_user(&user).await.map_err(Error::Store)?;
        written += 1;
    }

    info!(thread_id, written, "roster reconciled");
    Ok(written)
}
