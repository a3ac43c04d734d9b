//! Equirectangular projection of longitude/latitude onto the map canvas

/// A 2D point in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Move `longitude` by whole turns until it is within 180° of `reference`
///
/// When the world repeats horizontally this picks the copy of a feature
/// closest to the point of interest. A copy exactly half a turn away stays on
/// the side it came from.
pub fn nearest_copy(longitude: f64, reference: f64) -> f64 {
    if !longitude.is_finite() || !reference.is_finite() {
        return longitude;
    }
    let offset = longitude - reference;
    if offset.abs() <= 180.0 {
        return longitude;
    }
    let mut wrapped = offset.rem_euclid(360.0);
    if wrapped > 180.0 || (wrapped == 180.0 && offset < 0.0) {
        wrapped -= 360.0;
    }
    reference + wrapped
}

/// Equatorial circumference in kilometres
const EARTH_CIRCUMFERENCE_KM: f64 = 40_075.016_686;

/// A round ground distance and its length on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBar {
    pub km: f64,
    /// Bar length in pixels
    pub width: f64,
}

impl ScaleBar {
    /// Text shown next to the bar, in metres below one kilometre
    pub fn label(&self) -> String {
        if self.km >= 1.0 {
            format!("{} km", self.km)
        } else {
            format!("{} m", (self.km * 1000.0).round())
        }
    }
}

/// Largest 1, 2, 3 or 5 times a power of ten not above `distance`
fn round_down(distance: f64) -> f64 {
    let pow10 = 10f64.powi(distance.log10().floor() as i32);
    let digit = distance / pow10;
    let digit = if digit >= 10.0 {
        10.0
    } else if digit >= 5.0 {
        5.0
    } else if digit >= 3.0 {
        3.0
    } else if digit >= 2.0 {
        2.0
    } else {
        1.0
    };
    digit * pow10
}

/// Maps `[longitude, latitude]` into a `width` x `height` canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub width: f64,
    pub height: f64,
    /// Map center `[longitude, latitude]`
    pub center: [f64; 2],
}

impl Projection {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            center: [0.0, 0.0],
        }
    }

    /// Canvas position of a coordinate, `None` if it is not a real number
    pub fn project(&self, [longitude, latitude]: [f64; 2]) -> Option<Point> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        let [center_lng, center_lat] = self.center;
        let longitude = nearest_copy(longitude, center_lng);
        let latitude = latitude.clamp(-90.0, 90.0);

        let x = self.width / 2.0 + (longitude - center_lng) * self.width / 360.0;
        let y = self.height / 2.0 - (latitude - center_lat) * self.height / 180.0;
        Some(Point::new(x, y))
    }

    /// Canvas x of a meridian
    pub fn x_of(&self, longitude: f64) -> f64 {
        self.width / 2.0 + (longitude - self.center[0]) * self.width / 360.0
    }

    /// Canvas y of a parallel
    pub fn y_of(&self, latitude: f64) -> f64 {
        self.height / 2.0 - (latitude - self.center[1]) * self.height / 180.0
    }

    /// Ground distance across one pixel along the center parallel
    pub fn km_per_pixel(&self) -> f64 {
        EARTH_CIRCUMFERENCE_KM * self.center[1].to_radians().cos() / self.width
    }

    /// The longest round distance that fits in `max_width` pixels
    pub fn scale_bar(&self, max_width: f64) -> Option<ScaleBar> {
        let km_per_pixel = self.km_per_pixel();
        let max_km = km_per_pixel * max_width;
        if !(max_km.is_finite() && max_km > 0.0) {
            return None;
        }
        let km = round_down(max_km);
        Some(ScaleBar {
            km,
            width: (km / km_per_pixel).round(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_copy() {
        assert_eq!(nearest_copy(10.0, 0.0), 10.0);
        assert_eq!(nearest_copy(190.0, 0.0), -170.0);
        assert_eq!(nearest_copy(-540.0, 0.0), -180.0);
        assert_eq!(nearest_copy(-170.0, 175.0), 190.0);
    }

    #[test]
    fn test_nearest_copy_far_away() {
        let wrapped = nearest_copy(1e20, 0.0);
        assert!(wrapped.abs() <= 180.0);
        let wrapped = nearest_copy(-1e12 - 0.5, 10.0);
        assert!((wrapped - 10.0).abs() <= 180.0);
        assert_eq!(nearest_copy(3600.0 + 45.0, 0.0), 45.0);
    }

    #[test]
    fn test_project_huge_longitude() {
        let projection = Projection::new(360.0, 180.0);
        let at = projection.project([1e20, 2.0]).unwrap();
        assert!((0.0..=360.0).contains(&at.x));
    }

    #[test]
    fn test_nearest_copy_non_finite() {
        assert!(nearest_copy(f64::NAN, 0.0).is_nan());
        assert_eq!(nearest_copy(f64::INFINITY, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_project_corners() {
        let projection = Projection::new(360.0, 180.0);
        assert_eq!(projection.project([0.0, 0.0]), Some(Point::new(180.0, 90.0)));
        assert_eq!(projection.project([-180.0, 90.0]), Some(Point::new(0.0, 0.0)));
        assert_eq!(projection.project([180.0, -90.0]), Some(Point::new(360.0, 180.0)));
    }

    #[test]
    fn test_project_wraps_and_clamps() {
        let projection = Projection::new(360.0, 180.0);
        assert_eq!(projection.project([370.0, 0.0]), Some(Point::new(190.0, 90.0)));
        assert_eq!(projection.project([0.0, 120.0]), Some(Point::new(180.0, 0.0)));
    }

    #[test]
    fn test_project_rejects_nan() {
        let projection = Projection::new(360.0, 180.0);
        assert_eq!(projection.project([f64::NAN, 0.0]), None);
    }

    #[test]
    fn test_scale_bar_at_equator() {
        let projection = Projection::new(1024.0, 512.0);
        // ~39.1 km per pixel, 100 px fit ~3913 km
        let bar = projection.scale_bar(100.0).unwrap();
        assert_eq!(bar.km, 3000.0);
        assert_eq!(bar.width, 77.0);
        assert_eq!(bar.label(), "3000 km");
    }

    #[test]
    fn test_scale_bar_round_steps() {
        assert_eq!(round_down(4.2), 3.0);
        assert_eq!(round_down(99.0), 50.0);
        assert_eq!(round_down(1.0), 1.0);
        assert_eq!(round_down(2500.0), 2000.0);
    }

    #[test]
    fn test_scale_bar_metres() {
        let bar = ScaleBar { km: 0.5, width: 80.0 };
        assert_eq!(bar.label(), "500 m");
    }

    #[test]
    fn test_scale_bar_needs_width() {
        assert_eq!(Projection::new(0.0, 0.0).scale_bar(100.0), None);
        assert_eq!(Projection::new(1024.0, 512.0).scale_bar(0.0), None);
    }

    #[test]
    fn test_grid_lines() {
        let projection = Projection::new(1024.0, 512.0);
        assert_eq!(projection.x_of(0.0), 512.0);
        assert_eq!(projection.y_of(90.0), 0.0);
    }
}
