//! Built-in demo scenes.

use glam::Vec3;
use std::f32::consts::PI;

use crate::camera::PerspectiveCamera;
use crate::description::{
    Axis, Background, BindingSpec, Fog, ObjectDescriptor, ParamTarget, SceneDescription,
    ShadowMapType,
};
use crate::error::SceneError;
use crate::geometry::Geometry;
use crate::light::{Light, ShadowConfig};
use crate::material::{
    BasicMaterial, Material, MaterialParam, PhysicalMaterial, Side, TextureRef,
};
use crate::orbit::{MoonDescriptor, OrbitalSystem, PlanetDescriptor, SunDescriptor};
use orrery_common::Color;

const SOLAR_TEXTURES: &str = "/textures/solar";
const PANEL_TEXTURES: &str = "/textures/space-cruiser-panels2-bl/space-cruiser-panels2";

pub fn names() -> &'static [&'static str] {
    &["solar-system", "fog-boxes", "physical-material", "shadows"]
}

pub fn load(name: &str) -> Result<SceneDescription, SceneError> {
    match name {
        "solar-system" => Ok(solar_system()),
        "fog-boxes" => Ok(fog_boxes()),
        "physical-material" => Ok(physical_material()),
        "shadows" => Ok(shadows()),
        other => Err(SceneError::UnknownPreset(other.to_string())),
    }
}

fn moon(name: &str, radius: f32, distance: f64, speed: f64) -> MoonDescriptor {
    MoonDescriptor {
        name: name.into(),
        radius,
        distance,
        speed,
        material: None,
    }
}

fn planet(
    name: &str,
    radius: f32,
    distance: f64,
    speed: f64,
    moons: Vec<MoonDescriptor>,
) -> PlanetDescriptor {
    PlanetDescriptor {
        name: name.into(),
        radius,
        distance,
        speed,
        material: name.to_ascii_lowercase(),
        moons,
    }
}

/// Sun, four inner planets and their moons.
pub fn solar_system() -> SceneDescription {
    let mut scene = SceneDescription::new("solar-system");
    scene.background = Background::CubeMap {
        path: format!("{SOLAR_TEXTURES}/cube_map/"),
        faces: ["nx", "ny", "nz", "px", "py", "pz"].map(|f| format!("{f}.png")),
    };
    scene.camera = PerspectiveCamera::new(75.0, 0.1, 400.0, Vec3::new(0.0, 0.0, 40.0));

    scene.materials.insert(
        "sun".into(),
        Material::Basic(BasicMaterial {
            map: Some(TextureRef::new(format!("{SOLAR_TEXTURES}/8k_sun.jpg"))),
            ..BasicMaterial::default()
        }),
    );
    for (key, file) in [
        ("mercury", "8k_mercury.jpg"),
        ("venus", "8k_venus_surface.jpg"),
        ("earth", "8k_earth_daymap.jpg"),
        ("mars", "8k_mars.jpg"),
        ("moon", "8k_moon.jpg"),
    ] {
        scene.materials.insert(
            key.into(),
            Material::standard_mapped(&format!("{SOLAR_TEXTURES}/{file}")),
        );
    }

    scene.orbits = Some(OrbitalSystem {
        body_geometry: Geometry::sphere(1.0, 32),
        sun: Some(SunDescriptor {
            radius: 5.0,
            material: "sun".into(),
            spin: 0.01,
        }),
        moon_material: "moon".into(),
        planets: vec![
            planet("Mercury", 0.5, 10.0, 0.01, vec![]),
            planet("Venus", 0.8, 15.0, 0.007, vec![]),
            planet("Earth", 1.0, 20.0, 0.005, vec![moon("Moon", 0.3, 3.0, 0.015)]),
            planet(
                "Mars",
                0.7,
                25.0,
                0.003,
                vec![
                    moon("Phobos", 0.1, 2.0, 0.01),
                    moon("Deimos", 0.2, 3.0, 0.03),
                ],
            ),
        ],
    });

    scene.lights = vec![
        Light::Ambient {
            color: Color::WHITE,
            intensity: 0.05,
        },
        Light::Point {
            color: Color::WHITE,
            intensity: 300.0,
            distance: 0.0,
            position: Vec3::ZERO,
            helper: true,
        },
    ];

    scene.bindings = [Axis::X, Axis::Y, Axis::Z]
        .into_iter()
        .map(|axis| BindingSpec {
            target: ParamTarget::CameraPosition { axis },
            min: Some(0.0),
            max: None,
            step: Some(0.1),
            label: None,
        })
        .collect();
    scene
}

/// Translucent double-sided boxes and a plane fading into black fog.
pub fn fog_boxes() -> SceneDescription {
    let mut scene = SceneDescription::new("fog-boxes");
    scene.camera = PerspectiveCamera::new(75.0, 0.1, 30.0, Vec3::new(0.0, 0.0, 5.0));
    scene.fog = Some(Fog {
        color: Color::BLACK,
        near: 1.0,
        far: 10.0,
    });
    scene.materials.insert(
        "glass".into(),
        Material::Basic(BasicMaterial {
            color: Color::from_hex(0x90ee90),
            transparent: true,
            opacity: 0.5,
            side: Side::Double,
            fog: true,
            map: None,
        }),
    );
    scene.objects = vec![
        ObjectDescriptor::mesh("cube", Geometry::unit_box(), "glass"),
        ObjectDescriptor::mesh("cube-right", Geometry::unit_box(), "glass")
            .at(Vec3::new(1.5, 0.0, 0.0)),
        ObjectDescriptor::mesh("plane", Geometry::plane(1.0, 1.0), "glass")
            .at(Vec3::new(-1.5, 0.0, 0.0)),
    ];
    scene.bindings = vec![BindingSpec {
        target: ParamTarget::Material {
            material: "glass".into(),
            param: MaterialParam::Opacity,
        },
        min: Some(0.0),
        max: Some(1.0),
        step: Some(0.05),
        label: Some("opacity".into()),
    }];
    scene
}

fn panel_material(metalness: f32) -> Material {
    let tex = |suffix: &str| Some(TextureRef::new(format!("{PANEL_TEXTURES}_{suffix}.png")));
    Material::Physical(PhysicalMaterial {
        map: tex("albedo"),
        ao_map: tex("ao"),
        ao_map_intensity: 0.2,
        normal_map: tex("normal-ogl"),
        roughness_map: tex("roughness"),
        metalness_map: tex("metallic"),
        metalness,
        ..PhysicalMaterial::default()
    })
}

fn physical_bindings(material: &str) -> Vec<BindingSpec> {
    vec![
        BindingSpec::material(material, MaterialParam::Metalness, 0.0, 1.0, 0.1),
        BindingSpec::material(material, MaterialParam::Roughness, 0.0, 1.0, 0.1),
        BindingSpec::material(material, MaterialParam::Reflectivity, 0.0, 1.0, 0.1),
        BindingSpec::material(material, MaterialParam::Clearcoat, 0.0, 1.0, 0.1),
        BindingSpec::material(material, MaterialParam::AoMapIntensity, 0.0, 1.0, 0.01)
            .labeled("Ao Intensity"),
    ]
}

fn floor() -> ObjectDescriptor {
    ObjectDescriptor {
        rotation: Vec3::new(-PI * 0.5, 0.0, 0.0),
        scale: Vec3::new(10.0, 10.0, 1.0),
        ..ObjectDescriptor::mesh("floor", Geometry::plane(1.0, 1.0), "panels")
            .at(Vec3::new(0.0, -3.0, 0.0))
    }
}

/// Textured physically based primitives under a rect-area light.
pub fn physical_material() -> SceneDescription {
    let mut scene = SceneDescription::new("physical-material");
    scene.materials.insert("panels".into(), panel_material(0.8));

    let torus_knot = Geometry::TorusKnot {
        radius: 0.5,
        tube: 0.2,
        tubular_segments: 100,
        radial_segments: 10,
    };
    let cylinder = Geometry::Cylinder {
        radius_top: 0.5,
        radius_bottom: 0.5,
        height: 1.0,
        radial_segments: 32,
    };
    scene.objects = vec![ObjectDescriptor::group(
        "showcase",
        vec![
            ObjectDescriptor::mesh("box", Geometry::unit_box(), "panels"),
            ObjectDescriptor::mesh("torus-knot", torus_knot, "panels").at(Vec3::new(1.5, 0.0, 0.0)),
            floor(),
            ObjectDescriptor::mesh("sphere", Geometry::sphere(0.5, 32), "panels")
                .at(Vec3::new(0.0, 1.5, 0.0)),
            ObjectDescriptor::mesh("cylinder", cylinder, "panels").at(Vec3::new(-1.5, 0.0, 0.0)),
        ],
    )];
    scene.lights = vec![
        Light::Ambient {
            color: Color::WHITE,
            intensity: 0.5,
        },
        Light::RectArea {
            color: Color::from_hex(0x59ffe9),
            intensity: 10.0,
            width: 10.0,
            height: 2.0,
            position: Vec3::new(0.0, 3.0, 0.0),
            look_at: Vec3::ZERO,
            helper: true,
        },
    ];
    scene.bindings = physical_bindings("panels");
    scene
}

/// A shadow-casting sphere over a receiving floor.
pub fn shadows() -> SceneDescription {
    let mut scene = SceneDescription::new("shadows");
    scene.shadows = Some(ShadowMapType::PcfSoft);
    scene.materials.insert(
        "panels".into(),
        Material::Physical(PhysicalMaterial::default()),
    );

    let mut plane = floor();
    plane.receive_shadow = true;
    let mut sphere = ObjectDescriptor::mesh("sphere", Geometry::sphere(0.5, 32), "panels")
        .at(Vec3::new(0.0, 1.5, 0.0));
    sphere.cast_shadow = true;
    scene.objects = vec![ObjectDescriptor::group("stage", vec![plane, sphere])];

    scene.lights = vec![
        Light::Ambient {
            color: Color::WHITE,
            intensity: 0.5,
        },
        Light::Directional {
            color: Color::from_hex(0x59ffe9),
            intensity: 2.0,
            position: Vec3::new(0.0, 3.0, 0.0),
            target: Vec3::ONE,
            cast_shadow: true,
            shadow: ShadowConfig {
                map_size: 1024,
                radius: 5.0,
            },
            helper: true,
        },
    ];
    scene.bindings = physical_bindings("panels");
    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_loads() {
        for name in names() {
            assert_eq!(load(name).unwrap().name, *name);
        }
    }

    #[test]
    fn unknown_preset_errors() {
        assert!(matches!(load("saturn"), Err(SceneError::UnknownPreset(_))));
    }

    #[test]
    fn solar_system_matches_reference_configuration() {
        let scene = solar_system();
        let system = scene.orbits.as_ref().unwrap();
        assert_eq!(system.planets.len(), 4);
        assert_eq!(system.moon_count(), 3);
        let earth = &system.planets[2];
        assert_eq!(earth.name, "Earth");
        assert_eq!(earth.distance, 20.0);
        assert_eq!(earth.moons[0].speed, 0.015);
        assert_eq!(system.sun.as_ref().unwrap().spin, 0.01);
    }

    #[test]
    fn shadow_scene_has_caster_and_receiver() {
        let scene = shadows();
        let mut casters = 0;
        let mut receivers = 0;
        for object in &scene.objects {
            object.walk(&mut |o| {
                casters += o.cast_shadow as usize;
                receivers += o.receive_shadow as usize;
            });
        }
        assert_eq!((casters, receivers), (1, 1));
        assert!(scene.lights.iter().any(Light::casts_shadow));
    }

    #[test]
    fn physical_bindings_target_existing_params() {
        let scene = physical_material();
        let material = &scene.materials["panels"];
        for binding in &scene.bindings {
            if let ParamTarget::Material { param, .. } = binding.target {
                assert!(material.param(param).is_some());
            }
        }
        assert_eq!(scene.bindings[4].label(), "Ao Intensity");
    }
}
