use ndarray::{arr2, Array2, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    /// Rotates radial/transverse rows into north/east rows for back azimuth `baz_deg`.
    pub fn rotate_rt_ne(radial: &[f64], transverse: &[f64], baz_deg: f64) -> (Vec<f64>, Vec<f64>) {
        let len = radial.len().max(transverse.len());
        let mut rt = Array2::<f64>::zeros((2, len));
        for (index, value) in radial.iter().enumerate() {
            rt[[0, index]] = *value;
        }
        for (index, value) in transverse.iter().enumerate() {
            rt[[1, index]] = *value;
        }

        let baz = baz_deg.to_radians();
        let (sin, cos) = baz.sin_cos();
        let rotation = arr2(&[[-cos, sin], [-sin, -cos]]);
        let ne = Self::multiply(rotation.view(), rt.view());
        (ne.row(0).to_vec(), ne.row(1).to_vec())
    }

    /// Back azimuth (degrees from north, station towards event) on a sphere.
    pub fn back_azimuth(station_lat: f64, station_lon: f64, event_lat: f64, event_lon: f64) -> f64 {
        let (phi_s, phi_e) = (station_lat.to_radians(), event_lat.to_radians());
        let dlon = (event_lon - station_lon).to_radians();
        let y = dlon.sin() * phi_e.cos();
        let x = phi_s.cos() * phi_e.sin() - phi_s.sin() * phi_e.cos() * dlon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_azimuth_points_along_meridian() {
        assert!((MatrixHelper::back_azimuth(0.0, 0.0, 10.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((MatrixHelper::back_azimuth(10.0, 0.0, 0.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((MatrixHelper::back_azimuth(0.0, 0.0, 0.0, 10.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn event_due_north_maps_radial_to_negative_north() {
        // radial points away from the source, so with the event to the north it is -N
        let (north, east) = MatrixHelper::rotate_rt_ne(&[1.0, 2.0], &[0.0], 0.0);
        assert_eq!(north, vec![-1.0, -2.0]);
        assert!(east.iter().all(|v| v.abs() < 1e-12));
    }
}
