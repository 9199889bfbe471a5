//! Friends-of-friends suggestions ranked by mutual connection count.

use std::collections::HashMap;

use uuid::Uuid;

use crate::connections::affinity::SuggestedUser;
use crate::errors::AppError;
use crate::store::WellnessStore;

fn mutual_reason(count: i64) -> String {
    if count == 1 {
        "1 mutual connection".to_string()
    } else {
        format!("{count} mutual connections")
    }
}

pub async fn get_simple_suggestions(
    store: &dyn WellnessStore,
    user_id: Uuid,
    exclude: &[Uuid],
    limit: usize,
) -> Result<Vec<SuggestedUser>, AppError> {
    let counts = store
        .friends_of_friends(user_id, exclude, limit as i64)
        .await?;
    let ids: Vec<Uuid> = counts.iter().map(|c| c.user_id).collect();
    let profiles: HashMap<Uuid, _> = store
        .user_profiles(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(counts
        .into_iter()
        .filter_map(|c| {
            let profile = profiles.get(&c.user_id)?;
            Some(SuggestedUser {
                id: c.user_id,
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar_url.clone(),
                match_reasons: vec![mutual_reason(c.mutual_count)],
                score: c.mutual_count as f64,
            })
        })
        .collect())
}
