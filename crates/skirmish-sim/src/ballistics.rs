//! Ballistics math: swept collision, predictive intercept, damage falloff.
//!
//! Pure functions over plain geometry. Distances are world units, speeds
//! are world units per tick, angles are radians.

use glam::DVec2;

use skirmish_core::constants::MAX_DAMAGE_DROP;
use skirmish_core::types::{Position, Velocity};

const EPSILON: f64 = 1e-4;

fn vec(p: &Position) -> DVec2 {
    DVec2::new(p.x, p.y)
}

/// Whether the segment `a -> b` touches the circle at `center` with radius `r`.
pub fn segment_circle_intersects(a: DVec2, b: DVec2, center: DVec2, r: f64) -> bool {
    // Either endpoint inside the circle.
    if a.distance(center) <= r || b.distance(center) <= r {
        return true;
    }

    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPSILON * EPSILON {
        // Degenerate segment, covered by the endpoint checks above.
        return false;
    }

    // Perpendicular foot of the center on the segment's line.
    let t = (center - a).dot(ab) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    let foot = a + ab * t;
    foot.distance(center) <= r
}

/// Swept projectile test: did the projectile's movement segment from
/// `prev` to `curr` cross the target's bounding circle? The combined
/// radius includes the projectile's own size, so fast rounds cannot
/// tunnel through a target between ticks.
pub fn swept_hit(prev: &Position, curr: &Position, target: &Position, combined_radius: f64) -> bool {
    segment_circle_intersects(vec(prev), vec(curr), vec(target), combined_radius)
}

/// Predictive intercept point for a projectile of speed `projectile_speed`
/// fired from `shooter` at a target moving with per-tick velocity
/// `target_vel`.
///
/// Solves `(|V|^2 - s^2) t^2 + 2 (D . V) t + |D|^2 = 0` for the smallest
/// positive `t`; a vanishing quadratic coefficient falls back to the linear
/// solution, and when no positive root exists (the target outruns the
/// round while receding) the target's current position is returned.
pub fn intercept_point(
    shooter: &Position,
    target: &Position,
    target_vel: &Velocity,
    projectile_speed: f64,
) -> Position {
    let d = vec(target) - vec(shooter);
    let v = DVec2::new(target_vel.dx, target_vel.dy);

    let a = v.length_squared() - projectile_speed * projectile_speed;
    let b = 2.0 * d.dot(v);
    let c = d.length_squared();

    let t = if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return *target;
        }
        let t = -c / b;
        if t <= 0.0 {
            return *target;
        }
        t
    } else {
        let delta = b * b - 4.0 * a * c;
        if delta < 0.0 {
            return *target;
        }
        let sqrt_delta = delta.sqrt();
        let t1 = (-b - sqrt_delta) / (2.0 * a);
        let t2 = (-b + sqrt_delta) / (2.0 * a);
        match (t1 > 0.0, t2 > 0.0) {
            (true, true) => t1.min(t2),
            (true, false) => t1,
            (false, true) => t2,
            (false, false) => return *target,
        }
    };

    Position::new(target.x + target_vel.dx * t, target.y + target_vel.dy * t)
}

/// Explosion damage at `distance` from the blast center: linear falloff
/// from full damage at the center to `minimum_percent` of it at the blast
/// radius. Distance is clamped to [0, radius], so damage never exceeds the
/// configured maximum and never drops below the edge floor.
pub fn explosion_damage(full_damage: f64, minimum_percent: f64, distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return full_damage;
    }
    let d = distance.clamp(0.0, radius);
    let percent = minimum_percent + (1.0 - minimum_percent) * (1.0 - d / radius);
    full_damage * percent
}

/// Travel-distance attenuation: full damage until `start`, then a linear
/// drop reaching `MAX_DAMAGE_DROP * factor` of the damage at `end`.
pub fn travel_attenuation(damage: f64, travel: f64, start: f64, end: f64, factor: f64) -> f64 {
    if factor <= 0.0 || travel <= start {
        return damage;
    }
    let t = if end > start {
        ((travel - start) / (end - start)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    damage * (1.0 - MAX_DAMAGE_DROP * factor * t)
}
