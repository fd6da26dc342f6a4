use log::debug;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::errors::TrackerError;
use crate::tracker::structs::torrent_tracker::TorrentTracker;
use crate::tracker::structs::user_entry_item::UserEntryItem;
use crate::tracker::structs::user_id::UserId;
use crate::utils::bonus::{calculate_bonus, round_plus};

impl TorrentTracker {
    /// Resolves a passkey to an active user account.
    pub async fn authenticate(&self, passkey: &str) -> Result<UserId, TrackerError> {
        if passkey.is_empty() {
            return Err(TrackerError::Unauthorized("empty passkey".to_string()));
        }
        let user_id = UserId::from_passkey(passkey);
        match self.store.get_user(&user_id).await? {
            Some(user) if user.active => Ok(user_id),
            Some(_) => Err(TrackerError::Unauthorized("account disabled".to_string())),
            None => Err(TrackerError::Unauthorized("unknown passkey".to_string())),
        }
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<UserEntryItem>, TrackerError> {
        Ok(self.store.get_user(user_id).await?)
    }

    pub async fn add_user(&self, user_id: &UserId, user: &UserEntryItem) -> Result<(), TrackerError> {
        Ok(self.store.put_user(user_id, user).await?)
    }

    /// Settles one announce onto the user account: transfer deltas, a
    /// possible snatch, and bonus credit. Credit rewards sustained
    /// seeding, so it only accrues while the peer is seeding. The
    /// credit delta is rounded at persistence to keep user-facing
    /// totals stable.
    #[allow(clippy::too_many_arguments)]
    pub async fn settle_transfer(
        &self,
        user_id: &UserId,
        delta_uploaded: u64,
        delta_downloaded: u64,
        completed: bool,
        seeding: bool,
        session_seconds: u64,
        session_uploaded: u64,
    ) -> Result<(), TrackerError> {
        let config = self.config.load();
        let credit = if seeding {
            let bytes = if config.tracker_config.credit_whole_session {
                session_uploaded
            } else {
                delta_uploaded
            };
            round_plus(
                calculate_bonus(session_seconds, bytes, config.tracker_config.credit_multiplier),
                2,
            )
        } else {
            0.0
        };
        if delta_uploaded == 0 && delta_downloaded == 0 && !completed && credit == 0.0 {
            return Ok(());
        }
        debug!(
            "[Users] settle {}: up {} down {} completed {} credit {}",
            user_id, delta_uploaded, delta_downloaded, completed, credit
        );
        self.store
            .user_add_transfer(user_id, delta_uploaded, delta_downloaded, completed, credit)
            .await?;
        Ok(())
    }
}
