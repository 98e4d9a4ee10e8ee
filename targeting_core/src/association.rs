//! Association: pick the one object this sweep that best matches the track.
//!
//! - Active track → object nearest (squared distance) to the predicted position.
//! - Stale track  → object with the smallest radius, scored as radius².
//!
//! Ties keep the earliest object in sweep order.

use crate::{object::Object, track::Track};

/// Best candidate and its score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Index into the object list
    pub index: usize,
    /// Squared distance (mm²) used for gating
    pub distance_sq: i64,
}

/// Select the best object, or `None` for an empty list.
///
/// The track must already be predicted to the sweep time.
pub fn select_object(objects: &[Object], track: &Track) -> Option<Selection> {
    let now = objects.first()?.time;
    let active = track.recent_update(now);
    let score = |object: &Object| {
        if active {
            track.distance_sq(object)
        } else {
            let r = object.radius() as i64;
            r * r
        }
    };

    let mut best = Selection {
        index: 0,
        distance_sq: score(&objects[0]),
    };
    for (index, object) in objects.iter().enumerate().skip(1) {
        let distance_sq = score(object);
        if distance_sq < best.distance_sq {
            best = Selection { index, distance_sq };
        }
    }
    Some(best)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
