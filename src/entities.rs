use crate::constants::*;
use crate::types::{Vector2D, clamp_coordinate};
use crate::rendering::GameGrid;
use crossterm::style::Color;
use rand::Rng;

// --- Avatar (player-controlled blob) ---
pub struct Avatar {
    pub position: Vector2D,
    pub radius: f64,
    pub color: Color,
}

impl Avatar {
    pub fn new(x: f64, y: f64) -> Self {
        Avatar {
            position: Vector2D::new(x, y),
            radius: RADIUS,
            color: Color::Green,
        }
    }

    /// Moves by `speed` along every held direction, then clamps to the playfield.
    pub fn steer(&mut self, up: bool, down: bool, left: bool, right: bool, speed: f64) {
        if up {
            self.position.y -= speed;
        }
        if down {
            self.position.y += speed;
        }
        if left {
            self.position.x -= speed;
        }
        if right {
            self.position.x += speed;
        }

        self.position.x = clamp_coordinate(self.position.x, self.radius, WIDTH);
        self.position.y = clamp_coordinate(self.position.y, self.radius, HEIGHT);
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.fill_circle(self.position, self.radius, '@', self.color);
    }
}

// --- Screen edges bullets spawn from ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..4) {
            0 => Edge::Top,
            1 => Edge::Bottom,
            2 => Edge::Left,
            _ => Edge::Right,
        }
    }

    /// Uniformly random point along this edge.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vector2D {
        match self {
            Edge::Top => Vector2D::new(rng.gen_range(0.0..=WIDTH), 0.0),
            Edge::Bottom => Vector2D::new(rng.gen_range(0.0..=WIDTH), HEIGHT),
            Edge::Left => Vector2D::new(0.0, rng.gen_range(0.0..=HEIGHT)),
            Edge::Right => Vector2D::new(WIDTH, rng.gen_range(0.0..=HEIGHT)),
        }
    }
}

// --- Bullet struct ---
pub struct Bullet {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
    pub color: Color,
}

impl Bullet {
    /// Spawns on a random edge, aimed at `target`.
    pub fn new(target: Vector2D, rng: &mut impl Rng) -> Self {
        let origin = Edge::random(rng).random_point(rng);
        Bullet::aimed(origin, target)
    }

    pub fn aimed(origin: Vector2D, target: Vector2D) -> Self {
        // A target sitting exactly on the origin has no direction; head for the center instead.
        let direction = target
            .sub(origin)
            .normalized()
            .or_else(|| Vector2D::new(WIDTH / 2.0, HEIGHT / 2.0).sub(origin).normalized())
            .unwrap_or(Vector2D::new(1.0, 0.0));

        Bullet {
            position: origin,
            velocity: direction.scale(BULLET_SPEED),
            radius: BULLET_RADIUS,
            color: Color::Red,
        }
    }

    pub fn update(&mut self) {
        self.position = self.position.add(self.velocity);
    }

    pub fn check_collision(&self, target_x: f64, target_y: f64, target_radius: f64) -> bool {
        self.position.distance(Vector2D::new(target_x, target_y)) < self.radius + target_radius
    }

    pub fn is_on_screen(&self) -> bool {
        (0.0..=WIDTH).contains(&self.position.x) && (0.0..=HEIGHT).contains(&self.position.y)
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.fill_circle(self.position, self.radius, '*', self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn avatar_stays_inside_playfield() {
        let mut avatar = Avatar::new(START_X, START_Y);
        for _ in 0..200 {
            avatar.steer(true, false, true, false, BASE_SPEED);
        }
        assert_eq!(avatar.position, Vector2D::new(RADIUS, RADIUS));

        for _ in 0..400 {
            avatar.steer(false, true, false, true, BASE_SPEED + POWERUP_SPEED_BONUS);
        }
        assert_eq!(avatar.position, Vector2D::new(WIDTH - RADIUS, HEIGHT - RADIUS));
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let mut avatar = Avatar::new(START_X, START_Y);
        avatar.steer(true, true, true, true, BASE_SPEED);
        assert_eq!(avatar.position, Vector2D::new(START_X, START_Y));
    }

    #[test]
    fn bullet_from_left_edge_heads_for_target() {
        let bullet = Bullet::aimed(Vector2D::new(0.0, 300.0), Vector2D::new(100.0, 100.0));
        let expected = Vector2D::new(100.0, -200.0).normalized().unwrap().scale(BULLET_SPEED);
        assert!((bullet.velocity.x - expected.x).abs() < 1e-9);
        assert!((bullet.velocity.y - expected.y).abs() < 1e-9);
        assert!(bullet.velocity.x > 0.0 && bullet.velocity.y < 0.0);
    }

    #[test]
    fn random_bullets_start_on_an_edge_and_aim_at_target() {
        let mut rng = seeded_rng();
        let target = Vector2D::new(400.0, 250.0);
        for _ in 0..100 {
            let bullet = Bullet::new(target, &mut rng);
            let p = bullet.position;
            let on_edge = p.x == 0.0 || p.x == WIDTH || p.y == 0.0 || p.y == HEIGHT;
            assert!(on_edge, "spawned off-edge at {:?}", p);

            // Parallel to (target - origin): cross product vanishes, dot product positive.
            let to_target = target.sub(p);
            let cross = bullet.velocity.x * to_target.y - bullet.velocity.y * to_target.x;
            let dot = bullet.velocity.x * to_target.x + bullet.velocity.y * to_target.y;
            assert!(cross.abs() < 1e-6);
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn bullet_travels_fixed_distance_per_frame() {
        let mut rng = seeded_rng();
        let mut bullet = Bullet::new(Vector2D::new(123.0, 456.0), &mut rng);
        for _ in 0..50 {
            let before = bullet.position;
            bullet.update();
            assert!((bullet.position.distance(before) - BULLET_SPEED).abs() < 1e-9);
        }
    }

    #[test]
    fn collision_uses_sum_of_radii() {
        let bullet = Bullet::aimed(Vector2D::new(0.0, 300.0), Vector2D::new(100.0, 300.0));
        assert!(bullet.check_collision(14.9, 300.0, RADIUS));
        assert!(!bullet.check_collision(15.0, 300.0, RADIUS));
    }

    #[test]
    fn bullet_leaves_screen() {
        let mut bullet = Bullet::aimed(Vector2D::new(WIDTH, 10.0), Vector2D::new(WIDTH + 10.0, 10.0));
        assert!(bullet.is_on_screen());
        bullet.update();
        assert!(!bullet.is_on_screen());
    }

    #[test]
    fn edge_points_lie_on_their_edge() {
        let mut rng = seeded_rng();
        assert_eq!(Edge::Top.random_point(&mut rng).y, 0.0);
        assert_eq!(Edge::Bottom.random_point(&mut rng).y, HEIGHT);
        assert_eq!(Edge::Left.random_point(&mut rng).x, 0.0);
        assert_eq!(Edge::Right.random_point(&mut rng).x, WIDTH);
    }
}
