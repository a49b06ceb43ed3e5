//! Movement domain: ground, buffer-zone and wall probes.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{ContactProbes, Contacts, ControllerState, Facing, GameLayer, Player};

pub(crate) fn detect_contacts(
    spatial_query: SpatialQuery,
    mut query: Query<(&Transform, &ContactProbes, &ControllerState, &mut Contacts), With<Player>>,
) {
    // Only level geometry counts; the player's own collider is on another layer.
    let filter = SpatialQueryFilter::from_mask([GameLayer::Ground, GameLayer::Wall]);

    for (transform, probes, state, mut contacts) in &mut query {
        let origin = transform.translation.truncate();
        let probe = Collider::circle(probes.radius);
        let facing = state.facing;

        let overlaps = |offset: Vec2| {
            let point = ContactProbes::world_point(origin, offset, facing);
            !spatial_query
                .shape_intersections(&probe, point, 0.0, &filter)
                .is_empty()
        };

        let next = Contacts {
            grounded: probes.ground.iter().any(|&offset| overlaps(offset)),
            near_ground: overlaps(probes.buffer),
            touching_wall: probes.wall.iter().any(|&offset| overlaps(offset)),
        };

        if next.grounded != contacts.grounded {
            debug!("Ground contact: {} -> {}", contacts.grounded, next.grounded);
        }
        if next.touching_wall != contacts.touching_wall {
            debug!(
                "Wall contact ({:?}): {} -> {}",
                facing, contacts.touching_wall, next.touching_wall
            );
        }

        contacts.set_if_neq(next);
    }
}
