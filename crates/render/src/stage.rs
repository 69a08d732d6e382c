use glam::Vec3;
use orrery_common::{NodeHandle, Transform};
use orrery_kernel::{Body, Session, Spinner};
use orrery_scene::{Material, ObjectDescriptor, OrbitalSystem, SceneDescription};

use crate::error::RenderError;
use crate::graph::{Environment, NodeDescriptor, NodeKind};
use crate::renderer::SceneRenderer;

/// Builds renderer nodes and kernel bodies from a scene description.
pub struct Stage;

impl Stage {
    /// Create every node the description names and return a session whose
    /// bodies are bound to the orbiting nodes.
    pub fn build<R: SceneRenderer>(
        scene: &SceneDescription,
        mut renderer: R,
    ) -> Result<Session<R>, RenderError> {
        renderer.set_environment(Environment::from_description(scene));

        for object in &scene.objects {
            create_object(scene, &mut renderer, object, None)?;
        }

        let mut bodies = Vec::new();
        let mut spinners = Vec::new();
        if let Some(system) = &scene.orbits {
            stage_orbits(scene, system, &mut renderer, &mut bodies, &mut spinners)?;
        }

        let mut session = Session::new(renderer);
        for body in bodies {
            session.add_body(body);
        }
        for spinner in spinners {
            session.add_spinner(spinner);
        }
        tracing::info!(
            scene = %scene.name,
            bodies = session.bodies().len(),
            satellites = session.satellite_count(),
            "staged scene"
        );
        Ok(session)
    }
}

fn material<'a>(
    scene: &'a SceneDescription,
    name: &str,
    referrer: &str,
) -> Result<&'a Material, RenderError> {
    scene
        .materials
        .get(name)
        .ok_or_else(|| RenderError::UnknownMaterial {
            material: name.to_string(),
            referrer: referrer.to_string(),
        })
}

fn create_object<R: SceneRenderer>(
    scene: &SceneDescription,
    renderer: &mut R,
    object: &ObjectDescriptor,
    parent: Option<NodeHandle>,
) -> Result<NodeHandle, RenderError> {
    let transform = object.transform();
    let descriptor = match &object.mesh {
        Some(mesh) => NodeDescriptor {
            name: object.name.clone(),
            kind: NodeKind::Mesh {
                geometry: mesh.geometry,
                material_name: mesh.material.clone(),
                material: material(scene, &mesh.material, &object.name)?.clone(),
                cast_shadow: object.cast_shadow,
                receive_shadow: object.receive_shadow,
            },
            transform,
        },
        None => NodeDescriptor::group(&object.name, transform),
    };
    let handle = renderer.create_node(descriptor, parent)?;
    for child in &object.children {
        create_object(scene, renderer, child, Some(handle))?;
    }
    Ok(handle)
}

fn body_transform(radius: f32, distance: f64) -> Transform {
    Transform {
        position: Vec3::new(distance as f32, 0.0, 0.0),
        scale: Vec3::splat(radius),
        ..Transform::default()
    }
}

fn stage_orbits<R: SceneRenderer>(
    scene: &SceneDescription,
    system: &OrbitalSystem,
    renderer: &mut R,
    bodies: &mut Vec<Body>,
    spinners: &mut Vec<Spinner>,
) -> Result<(), RenderError> {
    let geometry = system.body_geometry;

    if let Some(sun) = &system.sun {
        let handle = renderer.create_node(
            NodeDescriptor::mesh(
                "Sun",
                geometry,
                &sun.material,
                material(scene, &sun.material, "Sun")?.clone(),
                Transform {
                    scale: Vec3::splat(sun.radius),
                    ..Transform::default()
                },
            ),
            None,
        )?;
        if sun.spin != 0.0 {
            spinners.push(Spinner::new(handle, sun.spin));
        }
    }

    for planet in &system.planets {
        let planet_node = renderer.create_node(
            NodeDescriptor::mesh(
                &planet.name,
                geometry,
                &planet.material,
                material(scene, &planet.material, &planet.name)?.clone(),
                body_transform(planet.radius, planet.distance),
            ),
            None,
        )?;
        let mut body = Body::new(&planet.name, planet.speed, planet.distance).bound_to(planet_node);

        for moon in &planet.moons {
            let moon_material = moon.material_or(&system.moon_material);
            let moon_node = renderer.create_node(
                NodeDescriptor::mesh(
                    &moon.name,
                    geometry,
                    moon_material,
                    material(scene, moon_material, &moon.name)?.clone(),
                    body_transform(moon.radius, moon.distance),
                ),
                Some(planet_node),
            )?;
            body = body.with_satellite(
                Body::new(&moon.name, moon.speed, moon.distance).bound_to(moon_node),
            );
        }
        bodies.push(body);
    }
    Ok(())
}
