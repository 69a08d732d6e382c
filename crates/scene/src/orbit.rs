use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// A satellite orbiting a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonDescriptor {
    pub name: String,
    /// Visual scale applied to the shared sphere.
    pub radius: f32,
    /// Orbital radius in the parent's local frame.
    pub distance: f64,
    /// Angular speed in radians per tick.
    pub speed: f64,
    /// Overrides the system-wide moon material.
    #[serde(default)]
    pub material: Option<String>,
}

/// A planet orbiting the system origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDescriptor {
    pub name: String,
    pub radius: f32,
    pub distance: f64,
    pub speed: f64,
    pub material: String,
    #[serde(default)]
    pub moons: Vec<MoonDescriptor>,
}

/// The central, non-orbiting body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunDescriptor {
    pub radius: f32,
    pub material: String,
    /// Self-rotation about Y in radians per tick.
    #[serde(default)]
    pub spin: f64,
}

/// Static configuration of an animated planetary system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalSystem {
    /// Geometry shared by the sun, every planet and every moon.
    pub body_geometry: Geometry,
    #[serde(default)]
    pub sun: Option<SunDescriptor>,
    /// Default material for moons without an override.
    pub moon_material: String,
    pub planets: Vec<PlanetDescriptor>,
}

impl OrbitalSystem {
    pub fn moon_count(&self) -> usize {
        self.planets.iter().map(|p| p.moons.len()).sum()
    }

    /// Material names referenced by the system, in declaration order.
    pub fn material_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        if let Some(sun) = &self.sun {
            refs.push(sun.material.as_str());
        }
        refs.push(self.moon_material.as_str());
        for planet in &self.planets {
            refs.push(planet.material.as_str());
            refs.extend(planet.moons.iter().filter_map(|m| m.material.as_deref()));
        }
        refs
    }
}

impl MoonDescriptor {
    pub fn material_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.material.as_deref().unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> OrbitalSystem {
        OrbitalSystem {
            body_geometry: Geometry::sphere(1.0, 32),
            sun: Some(SunDescriptor {
                radius: 5.0,
                material: "sun".into(),
                spin: 0.01,
            }),
            moon_material: "moon".into(),
            planets: vec![PlanetDescriptor {
                name: "Mars".into(),
                radius: 0.7,
                distance: 25.0,
                speed: 0.003,
                material: "mars".into(),
                moons: vec![
                    MoonDescriptor {
                        name: "Phobos".into(),
                        radius: 0.1,
                        distance: 2.0,
                        speed: 0.01,
                        material: None,
                    },
                    MoonDescriptor {
                        name: "Deimos".into(),
                        radius: 0.2,
                        distance: 3.0,
                        speed: 0.03,
                        material: Some("white".into()),
                    },
                ],
            }],
        }
    }

    #[test]
    fn counts_moons() {
        assert_eq!(system().moon_count(), 2);
    }

    #[test]
    fn collects_material_refs() {
        assert_eq!(system().material_refs(), vec!["sun", "moon", "mars", "white"]);
    }

    #[test]
    fn moon_material_falls_back() {
        let sys = system();
        let moons = &sys.planets[0].moons;
        assert_eq!(moons[0].material_or(&sys.moon_material), "moon");
        assert_eq!(moons[1].material_or(&sys.moon_material), "white");
    }
}
