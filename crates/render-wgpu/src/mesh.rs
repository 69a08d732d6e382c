use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use orrery_scene::Geometry;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
        }
    }
}

/// Triangle list for a geometry primitive.
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Tessellate a primitive into a triangle list, centred on the origin.
pub fn tessellate(geometry: &Geometry) -> MeshData {
    match *geometry {
        Geometry::Box {
            width,
            height,
            depth,
        } => box_mesh(Vec3::new(width, height, depth) * 0.5),
        Geometry::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere_mesh(radius, width_segments, height_segments),
        Geometry::Plane { width, height } => plane_mesh(width * 0.5, height * 0.5),
        Geometry::Cylinder {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
        } => cylinder_mesh(radius_top, radius_bottom, height, radial_segments),
        Geometry::TorusKnot {
            radius,
            tube,
            tubular_segments,
            radial_segments,
        } => torus_knot_mesh(radius, tube, tubular_segments, radial_segments, 2.0, 3.0),
    }
}

fn box_mesh(h: Vec3) -> MeshData {
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * h;
            vertices.push(Vertex::new(p, normal));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    MeshData { vertices, indices }
}

fn plane_mesh(hw: f32, hh: f32) -> MeshData {
    let vertices = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
        .into_iter()
        .map(|(x, y)| Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z))
        .collect();
    MeshData {
        vertices,
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let n = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            vertices.push(Vertex::new(n * radius, n));
        }
    }
    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    MeshData { vertices, indices }
}

fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for (y, r) in [(half, radius_top), (-half, radius_bottom)] {
        for i in 0..=segments {
            let a = i as f32 / segments as f32 * TAU;
            let (s, c) = a.sin_cos();
            vertices.push(Vertex::new(Vec3::new(r * s, y, r * c), Vec3::new(s, slope, c)));
        }
    }
    let row = segments + 1;
    for i in 0..segments {
        let (a, b, c, d) = (i, row + i, row + i + 1, i + 1);
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    for (y, r, normal) in [(half, radius_top, Vec3::Y), (-half, radius_bottom, Vec3::NEG_Y)] {
        if r <= 0.0 {
            continue;
        }
        let center = vertices.len() as u32;
        vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), normal));
        for i in 0..=segments {
            let a = i as f32 / segments as f32 * TAU;
            let (s, c) = a.sin_cos();
            vertices.push(Vertex::new(Vec3::new(r * s, y, r * c), normal));
        }
        for i in 0..segments {
            let (p, q) = (center + 1 + i, center + 2 + i);
            if normal.y > 0.0 {
                indices.extend_from_slice(&[center, p, q]);
            } else {
                indices.extend_from_slice(&[center, q, p]);
            }
        }
    }
    MeshData { vertices, indices }
}

fn knot_point(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let qr = q / p * u;
    let cs = qr.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * qr.sin() * 0.5,
    )
}

fn torus_knot_mesh(radius: f32, tube: f32, tubular: u32, radial: u32, p: f32, q: f32) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p * TAU;
        let p1 = knot_point(u, p, q, radius);
        let p2 = knot_point(u + 0.01, p, q, radius);
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let pos = p1 + n * cx + b * cy;
            vertices.push(Vertex::new(pos, pos - p1));
        }
    }
    let row = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    MeshData { vertices, indices }
}
