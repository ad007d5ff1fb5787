use bevy::prelude::*;

/// A free flag is grabbed by a tank closer than `grab_distance`
pub fn can_grab_flag(flag: Vec2, tank: Vec2, grab_distance: f32, already_carried: bool) -> bool {
    !already_carried && flag.distance(tank) < grab_distance
}

/// A carrier wins when it is back within `reach_distance` of its start
pub fn has_won(carrying_flag: bool, home: Vec2, tank: Vec2, reach_distance: f32) -> bool {
    carrying_flag && home.distance(tank) < reach_distance
}

pub fn carrier_max_speed(base: f32, carrier_factor: f32, carrying_flag: bool) -> f32 {
    if carrying_flag {
        base * carrier_factor
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_radius() {
        let flag = Vec2::new(4.5, 4.5);
        assert!(can_grab_flag(flag, Vec2::new(4.5, 4.1), 0.5, false));
        assert!(!can_grab_flag(flag, Vec2::new(4.5, 4.0), 0.5, false));
        assert!(!can_grab_flag(flag, flag, 0.5, true));
    }

    #[test]
    fn test_win_requires_flag_and_home() {
        let home = Vec2::new(0.5, 0.5);
        assert!(has_won(true, home, Vec2::new(0.6, 0.5), 0.2));
        assert!(!has_won(true, home, Vec2::new(0.8, 0.5), 0.2));
        assert!(!has_won(false, home, home, 0.2));
    }

    #[test]
    fn test_carrier_speed() {
        assert_eq!(carrier_max_speed(2.0, 0.5, true), 1.0);
        assert_eq!(carrier_max_speed(2.0, 0.5, false), 2.0);
    }
}
