//! 整数座標の幾何

use bevy::prelude::*;

/// オーバーフローしないよう i64 で計算する
pub fn distance_squared(a: IVec2, b: IVec2) -> i64 {
    let dx = i64::from(b.x) - i64::from(a.x);
    let dy = i64::from(b.y) - i64::from(a.y);
    dx * dx + dy * dy
}

pub fn within_range(a: IVec2, b: IVec2, range: i32) -> bool {
    let range = i64::from(range.max(0));
    distance_squared(a, b) <= range * range
}

/// `from` から `to` へ最大 `speed` だけ進んだ位置
pub fn step_towards(from: IVec2, to: IVec2, speed: i32) -> IVec2 {
    let dist_sq = distance_squared(from, to);
    let speed = i64::from(speed.max(0));
    if dist_sq <= speed * speed {
        return to;
    }

    let dist = (dist_sq as u64).isqrt() as i64;
    if dist == 0 {
        return to;
    }
    let dx = i64::from(to.x) - i64::from(from.x);
    let dy = i64::from(to.y) - i64::from(from.y);
    IVec2::new(
        from.x + (dx * speed / dist) as i32,
        from.y + (dy * speed / dist) as i32,
    )
}

/// `from` と `to` の間を `elapsed / total` で内分する。`total == 0` なら終点
pub fn lerp(from: IVec2, to: IVec2, elapsed: u32, total: u32) -> IVec2 {
    if total == 0 || elapsed >= total {
        return to;
    }
    let t = i64::from(elapsed);
    let n = i64::from(total);
    let x = i64::from(from.x) + (i64::from(to.x) - i64::from(from.x)) * t / n;
    let y = i64::from(from.y) + (i64::from(to.y) - i64::from(from.y)) * t / n;
    IVec2::new(x as i32, y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_towards_never_overshoots() {
        let from = IVec2::new(0, 0);
        let to = IVec2::new(300, 400);
        assert_eq!(step_towards(from, to, 100), IVec2::new(60, 80));
        assert_eq!(step_towards(IVec2::new(290, 390), to, 100), to);
    }

    #[test]
    fn lerp_hits_both_ends() {
        let from = IVec2::new(0, 0);
        let to = IVec2::new(100, -50);
        assert_eq!(lerp(from, to, 0, 4), from);
        assert_eq!(lerp(from, to, 2, 4), IVec2::new(50, -25));
        assert_eq!(lerp(from, to, 4, 4), to);
        assert_eq!(lerp(from, to, 0, 0), to);
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(within_range(IVec2::ZERO, IVec2::new(3, 4), 5));
        assert!(!within_range(IVec2::ZERO, IVec2::new(3, 4), 4));
    }
}
