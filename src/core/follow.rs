//! Explicit "follows" relation between sibling transforms.
//!
//! A follower copies its target's translation every frame after all
//! gameplay writes and before transform propagation, so the follower's
//! position never lags the target within a frame. Follower and target must
//! share a parent space (both roots, in practice).

use bevy::prelude::*;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Follows(pub Entity);

pub fn sync_followers(
    mut followers: Query<(Entity, &Follows, &mut Transform)>,
    targets: Query<&Transform, Without<Follows>>,
) {
    for (entity, follows, mut transform) in &mut followers {
        let Ok(target) = targets.get(follows.0) else {
            warn!("sync_followers: {:?} follows missing entity {:?}", entity, follows.0);
            continue;
        };
        if transform.translation != target.translation {
            transform.translation = target.translation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(sync_followers);
        schedule.run(world);
    }

    #[test]
    fn follower_tracks_every_target_move() {
        let mut world = World::new();
        let earth = world.spawn(Transform::from_xyz(0.0, 0.0, 0.0)).id();
        let pivot = world
            .spawn((Follows(earth), Transform::from_xyz(7.0, 7.0, 7.0)))
            .id();

        for pos in [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-40.0, 0.5, 12.0),
            Vec3::ZERO,
        ] {
            world.get_mut::<Transform>(earth).unwrap().translation = pos;
            run(&mut world);
            assert_eq!(world.get::<Transform>(pivot).unwrap().translation, pos);
        }
    }

    #[test]
    fn follower_keeps_its_own_rotation() {
        let mut world = World::new();
        let earth = world.spawn(Transform::from_xyz(3.0, 0.0, 0.0)).id();
        let rotation = Quat::from_rotation_y(1.2);
        let pivot = world
            .spawn((Follows(earth), Transform::from_rotation(rotation)))
            .id();

        run(&mut world);

        let transform = world.get::<Transform>(pivot).unwrap();
        assert_eq!(transform.translation, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(transform.rotation, rotation);
    }

    #[test]
    fn missing_target_leaves_follower_in_place() {
        let mut world = World::new();
        let gone = world.spawn(Transform::default()).id();
        world.despawn(gone);
        let pivot = world
            .spawn((Follows(gone), Transform::from_xyz(1.0, 1.0, 1.0)))
            .id();

        run(&mut world);

        assert_eq!(
            world.get::<Transform>(pivot).unwrap().translation,
            Vec3::ONE
        );
    }
}
