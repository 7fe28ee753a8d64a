/// Frame-rate independent exponential approach toward `target`.
///
/// Equivalent to `lerp(current, target, 1 - e^(-speed * dt))`: two half
/// frames land where one full frame would, and the factor stays in [0, 1)
/// so the value never overshoots.
#[inline(always)]
pub fn damp(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    if dt <= 0.0 || speed <= 0.0 {
        return current;
    }
    let t = 1.0 - (-speed * dt).exp();
    current + (target - current) * t
}

#[inline(always)]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[inline(always)]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
