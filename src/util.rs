use crate::all::*;

pub fn format_log(
  buf: &mut env_logger::fmt::Formatter,
  record: &log::Record,
) -> std::io::Result<()> {
  use std::io::Write;
  let mut style = buf.style();
  use env_logger::fmt::Color::*;
  use log::Level::*;
  style.set_color(match record.level() {
    Error => Red,
    Warn => Rgb(200, 200, 200),
    Info => Green,
    Debug => Magenta,
    Trace => Blue,
  });

  let s = format!("{:30}{}",
    format!("{}:{}",
      record.file().unwrap_or("?"),
      record.line().unwrap_or(0),
    ),
    record.args()
  );
  writeln!(buf, "{}", style.value(s))
}

#[inline]
pub fn lerp2(a: Vector2d, b: Vector2d, t: f64) -> Vector2d {
  a + (b - a) * t
}

// Per-element blend. Not a pose-space interpolation.
pub fn lerp4x4(a: &Matrix4d, b: &Matrix4d, t: f64) -> Matrix4d {
  a * (1. - t) + b * t
}

pub fn minmax2(points: &[Vector2d]) -> (Vector2d, Vector2d) {
  let mut min = Vector2d::repeat(f64::MAX);
  let mut max = Vector2d::repeat(f64::MIN);
  for p in points {
    for i in 0..2 {
      min[i] = min[i].min(p[i]);
      max[i] = max[i].max(p[i]);
    }
  }
  (min, max)
}

// Makes `name` unique among `taken` by appending `.001`, `.002`, ...
// A trailing numeric suffix already present on `name` is replaced.
pub fn unique_name<'a, I>(name: &str, fallback: &str, taken: I) -> String
  where I: IntoIterator<Item = &'a str>
{
  let taken: Vec<&str> = taken.into_iter().collect();
  let name = if name.is_empty() { fallback } else { name };
  if !taken.contains(&name) { return name.to_string() }
  let base = match name.rsplit_once('.') {
    Some((base, suffix)) if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) => base,
    _ => name,
  };
  let mut n = 1;
  loop {
    let candidate = format!("{}.{:03}", base, n);
    if !taken.contains(&candidate.as_str()) { return candidate }
    n += 1;
  }
}
