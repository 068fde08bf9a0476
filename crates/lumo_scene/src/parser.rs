//! Recursive-descent parser building a `Scene` from a token stream.
//!
//! The grammar is LL(1): every construct is announced by its leading
//! keyword, so one token of look-ahead (plus `unread_token`) is enough.
//! Parsing aborts at the first error.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use lumo_core::{read_pfm_image, Color};
use lumo_math::{
    rotation_x, rotation_y, rotation_z, scaling, translation, Point, Transformation,
};
use lumo_renderer::{Brdf, Camera, Material, Pigment, PointLight, Shape, World};

use crate::error::SceneError;
use crate::lexer::{InputStream, Keyword, SourceLocation, TokenKind};

/// Everything declared by a scene file.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub materials: HashMap<String, Material>,
    pub world: World,
    pub camera: Option<Camera>,
    pub float_variables: HashMap<String, f32>,
    /// Variables pinned from outside the file; redeclaring one is an
    /// error instead of a silent override in the wrong direction.
    overridden_variables: HashSet<String>,
}

impl Scene {
    /// Read and parse a scene file.
    ///
    /// `variables` pins float values from the outside (typically the
    /// command line); they shadow any `float` declaration in the file.
    pub fn from_file(path: &Path, variables: &HashMap<String, f32>) -> Result<Scene, SceneError> {
        let source = std::fs::read_to_string(path)?;
        let file_name = path.display().to_string();
        let mut input = InputStream::new(&source, &file_name);
        let scene = parse_scene(&mut input, variables)?;
        log::info!(
            "loaded scene '{}': {} shapes, {} lights",
            file_name,
            scene.world.shapes().len(),
            scene.world.point_lights().len()
        );
        Ok(scene)
    }
}

fn grammar_error(location: SourceLocation, message: String) -> SceneError {
    SceneError::Grammar { location, message }
}

fn expect_symbol(input: &mut InputStream, symbol: char) -> Result<(), SceneError> {
    let token = input.read_token()?;
    match token.kind {
        TokenKind::Symbol(s) if s == symbol => Ok(()),
        kind => Err(grammar_error(
            token.location,
            format!("expected '{symbol}', got {kind}"),
        )),
    }
}

fn expect_keywords(
    input: &mut InputStream,
    keywords: &[Keyword],
) -> Result<(Keyword, SourceLocation), SceneError> {
    let token = input.read_token()?;
    match token.kind {
        TokenKind::Keyword(keyword) if keywords.contains(&keyword) => {
            Ok((keyword, token.location))
        }
        kind => {
            let expected = keywords
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(grammar_error(
                token.location,
                format!("expected one of: {expected}; got {kind}"),
            ))
        }
    }
}

/// A number literal, or the name of a previously defined variable.
fn expect_number(input: &mut InputStream, scene: &Scene) -> Result<f32, SceneError> {
    let token = input.read_token()?;
    match token.kind {
        TokenKind::LiteralNumber(value) => Ok(value),
        TokenKind::Identifier(name) => match scene.float_variables.get(&name) {
            Some(&value) => Ok(value),
            None => Err(SceneError::UndefinedReference {
                location: token.location,
                kind: "variable",
                name,
            }),
        },
        kind => Err(grammar_error(
            token.location,
            format!("expected a number, got {kind}"),
        )),
    }
}

fn expect_string(input: &mut InputStream) -> Result<(String, SourceLocation), SceneError> {
    let token = input.read_token()?;
    match token.kind {
        TokenKind::LiteralString(value) => Ok((value, token.location)),
        kind => Err(grammar_error(
            token.location,
            format!("expected a string, got {kind}"),
        )),
    }
}

fn expect_identifier(input: &mut InputStream) -> Result<(String, SourceLocation), SceneError> {
    let token = input.read_token()?;
    match token.kind {
        TokenKind::Identifier(name) => Ok((name, token.location)),
        kind => Err(grammar_error(
            token.location,
            format!("expected an identifier, got {kind}"),
        )),
    }
}

/// `[x, y, z]`
fn parse_vector(input: &mut InputStream, scene: &Scene) -> Result<Vec3, SceneError> {
    expect_symbol(input, '[')?;
    let x = expect_number(input, scene)?;
    expect_symbol(input, ',')?;
    let y = expect_number(input, scene)?;
    expect_symbol(input, ',')?;
    let z = expect_number(input, scene)?;
    expect_symbol(input, ']')?;
    Ok(Vec3::new(x, y, z))
}

/// `<r, g, b>`
fn parse_color(input: &mut InputStream, scene: &Scene) -> Result<Color, SceneError> {
    expect_symbol(input, '<')?;
    let r = expect_number(input, scene)?;
    expect_symbol(input, ',')?;
    let g = expect_number(input, scene)?;
    expect_symbol(input, ',')?;
    let b = expect_number(input, scene)?;
    expect_symbol(input, '>')?;
    Ok(Color::new(r, g, b))
}

fn parse_pigment(input: &mut InputStream, scene: &Scene) -> Result<Pigment, SceneError> {
    let (keyword, _) = expect_keywords(
        input,
        &[Keyword::Uniform, Keyword::Checkered, Keyword::Image],
    )?;

    expect_symbol(input, '(')?;
    let pigment = match keyword {
        Keyword::Uniform => Pigment::Uniform {
            color: parse_color(input, scene)?,
        },
        Keyword::Checkered => {
            let color1 = parse_color(input, scene)?;
            expect_symbol(input, ',')?;
            let color2 = parse_color(input, scene)?;
            expect_symbol(input, ',')?;
            let steps = expect_number(input, scene)? as u32;
            Pigment::Checkered {
                color1,
                color2,
                steps,
            }
        }
        Keyword::Image => {
            let (path, location) = expect_string(input)?;
            let file = File::open(&path).map_err(|source| SceneError::FileRead {
                location: location.clone(),
                path: path.clone(),
                source,
            })?;
            let image =
                read_pfm_image(&mut BufReader::new(file)).map_err(|source| {
                    SceneError::InvalidImage {
                        location,
                        path,
                        source,
                    }
                })?;
            Pigment::Image {
                image: Arc::new(image),
            }
        }
        _ => unreachable!(),
    };
    expect_symbol(input, ')')?;
    Ok(pigment)
}

fn parse_brdf(input: &mut InputStream, scene: &Scene) -> Result<Brdf, SceneError> {
    let (keyword, _) = expect_keywords(input, &[Keyword::Diffuse, Keyword::Specular])?;
    expect_symbol(input, '(')?;
    let pigment = parse_pigment(input, scene)?;
    expect_symbol(input, ')')?;

    Ok(match keyword {
        Keyword::Diffuse => Brdf::Diffuse { pigment },
        Keyword::Specular => Brdf::Specular { pigment },
        _ => unreachable!(),
    })
}

/// `material name(brdf, pigment)`
fn parse_material(
    input: &mut InputStream,
    scene: &Scene,
) -> Result<(String, Material), SceneError> {
    let (name, _) = expect_identifier(input)?;

    expect_symbol(input, '(')?;
    let brdf = parse_brdf(input, scene)?;
    expect_symbol(input, ',')?;
    let emitted_radiance = parse_pigment(input, scene)?;
    expect_symbol(input, ')')?;

    Ok((
        name,
        Material {
            brdf,
            emitted_radiance,
        },
    ))
}

/// A chain of basic transformations composed with `*`, applied
/// left-to-right to the shape's local frame.
fn parse_transformation(
    input: &mut InputStream,
    scene: &Scene,
) -> Result<Transformation, SceneError> {
    let mut result = Transformation::IDENTITY;

    loop {
        let (keyword, location) = expect_keywords(
            input,
            &[
                Keyword::Identity,
                Keyword::Translation,
                Keyword::RotationX,
                Keyword::RotationY,
                Keyword::RotationZ,
                Keyword::Scaling,
            ],
        )?;

        match keyword {
            Keyword::Identity => {}
            Keyword::Translation => {
                expect_symbol(input, '(')?;
                let v = parse_vector(input, scene)?;
                expect_symbol(input, ')')?;
                result = result * translation(v);
            }
            Keyword::RotationX | Keyword::RotationY | Keyword::RotationZ => {
                expect_symbol(input, '(')?;
                let angle_deg = expect_number(input, scene)?;
                expect_symbol(input, ')')?;
                result = result
                    * match keyword {
                        Keyword::RotationX => rotation_x(angle_deg),
                        Keyword::RotationY => rotation_y(angle_deg),
                        _ => rotation_z(angle_deg),
                    };
            }
            Keyword::Scaling => {
                expect_symbol(input, '(')?;
                let v = parse_vector(input, scene)?;
                expect_symbol(input, ')')?;
                result = result
                    * scaling(v)
                        .map_err(|source| SceneError::SingularTransform { location, source })?;
            }
            _ => unreachable!(),
        }

        // Keep composing as long as a '*' follows.
        let token = input.read_token()?;
        if token.kind != TokenKind::Symbol('*') {
            input.unread_token(token);
            return Ok(result);
        }
    }
}

fn lookup_material<'a>(
    scene: &'a Scene,
    name: String,
    location: SourceLocation,
) -> Result<&'a Material, SceneError> {
    scene
        .materials
        .get(&name)
        .ok_or(SceneError::UndefinedReference {
            location,
            kind: "material",
            name,
        })
}

/// `sphere(material_name, transformation)`
fn parse_sphere(input: &mut InputStream, scene: &Scene) -> Result<Shape, SceneError> {
    expect_symbol(input, '(')?;
    let (name, location) = expect_identifier(input)?;
    let material = lookup_material(scene, name, location)?.clone();
    expect_symbol(input, ',')?;
    let transformation = parse_transformation(input, scene)?;
    expect_symbol(input, ')')?;

    Ok(Shape::sphere(transformation, material))
}

/// `plane(material_name, transformation)`
fn parse_plane(input: &mut InputStream, scene: &Scene) -> Result<Shape, SceneError> {
    expect_symbol(input, '(')?;
    let (name, location) = expect_identifier(input)?;
    let material = lookup_material(scene, name, location)?.clone();
    expect_symbol(input, ',')?;
    let transformation = parse_transformation(input, scene)?;
    expect_symbol(input, ')')?;

    Ok(Shape::plane(transformation, material))
}

/// `camera(type, transformation, aspect_ratio, distance)`
fn parse_camera(input: &mut InputStream, scene: &Scene) -> Result<Camera, SceneError> {
    expect_symbol(input, '(')?;
    let (keyword, _) = expect_keywords(input, &[Keyword::Orthogonal, Keyword::Perspective])?;
    expect_symbol(input, ',')?;
    let transformation = parse_transformation(input, scene)?;
    expect_symbol(input, ',')?;
    let aspect_ratio = expect_number(input, scene)?;
    expect_symbol(input, ',')?;
    let distance = expect_number(input, scene)?;
    expect_symbol(input, ')')?;

    Ok(match keyword {
        Keyword::Orthogonal => Camera::orthogonal(aspect_ratio, transformation),
        Keyword::Perspective => Camera::perspective(distance, aspect_ratio, transformation),
        _ => unreachable!(),
    })
}

/// `pointlight([x, y, z], <r, g, b>, linear_radius)`
fn parse_pointlight(input: &mut InputStream, scene: &Scene) -> Result<PointLight, SceneError> {
    expect_symbol(input, '(')?;
    let position = parse_vector(input, scene)?;
    expect_symbol(input, ',')?;
    let color = parse_color(input, scene)?;
    expect_symbol(input, ',')?;
    let linear_radius = expect_number(input, scene)?;
    expect_symbol(input, ')')?;

    Ok(PointLight {
        position: Point(position),
        color,
        linear_radius,
    })
}

/// Parse a whole scene from `input`.
///
/// `variables` holds externally pinned floats; a `float` declaration
/// for a pinned name is rejected so a typo cannot silently drop the
/// override.
pub fn parse_scene(
    input: &mut InputStream,
    variables: &HashMap<String, f32>,
) -> Result<Scene, SceneError> {
    let mut scene = Scene {
        float_variables: variables.clone(),
        overridden_variables: variables.keys().cloned().collect(),
        ..Scene::default()
    };

    loop {
        let token = input.read_token()?;
        let what = match token.kind {
            TokenKind::Stop => break,
            TokenKind::Keyword(keyword) => keyword,
            kind => {
                return Err(grammar_error(
                    token.location,
                    format!("expected a keyword, got {kind}"),
                ))
            }
        };

        match what {
            Keyword::Float => {
                let (name, location) = expect_identifier(input)?;
                expect_symbol(input, '(')?;
                let value = expect_number(input, &scene)?;
                expect_symbol(input, ')')?;

                if scene.overridden_variables.contains(&name) {
                    return Err(SceneError::Redefinition { location, name });
                }
                scene.float_variables.insert(name, value);
            }
            Keyword::Material => {
                let (name, material) = parse_material(input, &scene)?;
                scene.materials.insert(name, material);
            }
            Keyword::Sphere => {
                let shape = parse_sphere(input, &scene)?;
                scene.world.add(shape);
            }
            Keyword::Plane => {
                let shape = parse_plane(input, &scene)?;
                scene.world.add(shape);
            }
            Keyword::PointLight => {
                let light = parse_pointlight(input, &scene)?;
                scene.world.add_light(light);
            }
            Keyword::Camera => {
                if scene.camera.is_some() {
                    return Err(SceneError::Redefinition {
                        location: token.location,
                        name: "camera".to_string(),
                    });
                }
                scene.camera = Some(parse_camera(input, &scene)?);
            }
            other => {
                return Err(grammar_error(
                    token.location,
                    format!("unexpected keyword '{other}'"),
                ))
            }
        }
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    fn parse(source: &str) -> Result<Scene, SceneError> {
        let mut input = InputStream::new(source, "");
        parse_scene(&mut input, &HashMap::new())
    }

    const DEMO_SCENE: &str = r#"
    float clock(150)

    material sky_material(
        diffuse(uniform(<0, 0, 0>)),
        uniform(<0.7, 0.5, 1>)
    )

    # Here is a comment

    material ground_material(
        diffuse(checkered(<0.3, 0.5, 0.1>,
                          <0.1, 0.2, 0.5>, 4)),
        uniform(<0, 0, 0>)
    )

    material sphere_material(
        specular(uniform(<0.5, 0.5, 0.5>)),
        uniform(<0, 0, 0>)
    )

    plane (sky_material, translation([0, 0, 100]) * rotation_y(clock))
    plane (ground_material, identity)

    sphere(sphere_material, translation([0, 0, 1]))

    camera(perspective, rotation_z(30) * translation([-4, 0, 1]), 1.0, 2.0)
    "#;

    #[test]
    fn test_parse_scene() {
        let scene = parse(DEMO_SCENE).expect("the demo scene must parse");

        assert_eq!(scene.float_variables.len(), 1);
        assert_eq!(scene.float_variables["clock"], 150.0);

        assert_eq!(scene.materials.len(), 3);
        assert!(scene.materials.contains_key("sky_material"));
        assert!(scene.materials.contains_key("ground_material"));
        assert!(scene.materials.contains_key("sphere_material"));

        let sky = &scene.materials["sky_material"];
        assert!(matches!(
            &sky.brdf,
            Brdf::Diffuse {
                pigment: Pigment::Uniform { color }
            } if *color == vec3(0.0, 0.0, 0.0)
        ));
        assert!(matches!(
            &sky.emitted_radiance,
            Pigment::Uniform { color } if *color == vec3(0.7, 0.5, 1.0)
        ));

        let ground = &scene.materials["ground_material"];
        assert!(matches!(
            &ground.brdf,
            Brdf::Diffuse {
                pigment: Pigment::Checkered { color1, color2, steps: 4 }
            } if *color1 == vec3(0.3, 0.5, 0.1) && *color2 == vec3(0.1, 0.2, 0.5)
        ));

        let shapes = scene.world.shapes();
        assert_eq!(shapes.len(), 3);
        assert!(matches!(shapes[0], Shape::Plane { .. }));
        assert!(shapes[0].transformation().abs_diff_eq(
            &(translation(vec3(0.0, 0.0, 100.0)) * rotation_y(150.0)),
            1e-5
        ));
        assert!(matches!(shapes[1], Shape::Plane { .. }));
        assert!(shapes[1]
            .transformation()
            .abs_diff_eq(&Transformation::IDENTITY, 1e-5));
        assert!(matches!(shapes[2], Shape::Sphere { .. }));
        assert!(shapes[2]
            .transformation()
            .abs_diff_eq(&translation(vec3(0.0, 0.0, 1.0)), 1e-5));

        match scene.camera {
            Some(Camera::Perspective {
                screen_distance,
                aspect_ratio,
                transformation,
            }) => {
                assert_eq!(screen_distance, 2.0);
                assert_eq!(aspect_ratio, 1.0);
                assert!(transformation.abs_diff_eq(
                    &(rotation_z(30.0) * translation(vec3(-4.0, 0.0, 1.0))),
                    1e-5
                ));
            }
            other => panic!("expected a perspective camera, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_pointlight() {
        let scene = parse("pointlight([1, 2, 3], <4, 5, 6>, 0.5)").unwrap();
        let lights = scene.world.point_lights();
        assert_eq!(lights.len(), 1);
        assert!(lights[0].position.abs_diff_eq(Point::new(1.0, 2.0, 3.0), 1e-6));
        assert_eq!(lights[0].color, vec3(4.0, 5.0, 6.0));
        assert_eq!(lights[0].linear_radius, 0.5);
    }

    #[test]
    fn test_undefined_material() {
        let result = parse("plane(this_material_does_not_exist, identity)");
        match result {
            Err(SceneError::UndefinedReference { kind, name, .. }) => {
                assert_eq!(kind, "material");
                assert_eq!(name, "this_material_does_not_exist");
            }
            other => panic!("expected an undefined reference, got {other:?}"),
        }
    }

    #[test]
    fn test_undefined_variable() {
        let result = parse("sphere(foo, translation([0, 0, missing]))");
        // The material lookup fails first, so define one.
        let result2 = parse(
            "material m(diffuse(uniform(<0, 0, 0>)), uniform(<0, 0, 0>))\n\
             sphere(m, translation([0, 0, missing]))",
        );
        assert!(matches!(result, Err(SceneError::UndefinedReference { .. })));
        match result2 {
            Err(SceneError::UndefinedReference { kind, name, .. }) => {
                assert_eq!(kind, "variable");
                assert_eq!(name, "missing");
            }
            other => panic!("expected an undefined reference, got {other:?}"),
        }
    }

    #[test]
    fn test_double_camera() {
        let result = parse(
            "camera(perspective, rotation_z(30) * translation([-4, 0, 1]), 1.0, 1.0)\n\
             camera(orthogonal, identity, 1.0, 1.0)",
        );
        match result {
            Err(SceneError::Redefinition { name, location }) => {
                assert_eq!(name, "camera");
                assert_eq!(location.line_num, 2);
            }
            other => panic!("expected a redefinition error, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_override() {
        let variables = HashMap::from([("clock".to_string(), 200.0_f32)]);

        // A pinned variable keeps its external value.
        let mut input = InputStream::new(
            "material m(diffuse(uniform(<0, 0, 0>)), uniform(<0, 0, 0>))\n\
             plane(m, rotation_y(clock))",
            "",
        );
        let scene = parse_scene(&mut input, &variables).unwrap();
        assert!(scene.world.shapes()[0]
            .transformation()
            .abs_diff_eq(&rotation_y(200.0), 1e-5));

        // Redeclaring it in the file is an error.
        let mut input = InputStream::new("float clock(150)", "");
        let result = parse_scene(&mut input, &variables);
        assert!(matches!(result, Err(SceneError::Redefinition { name, .. }) if name == "clock"));
    }

    #[test]
    fn test_grammar_error_location() {
        let result = parse("plane(");
        match result {
            Err(SceneError::Grammar { location, .. }) => {
                assert_eq!(location.line_num, 1);
            }
            other => panic!("expected a grammar error, got {other:?}"),
        }
    }

    #[test]
    fn test_singular_scaling_rejected() {
        let result = parse(
            "material m(diffuse(uniform(<0, 0, 0>)), uniform(<0, 0, 0>))\n\
             sphere(m, scaling([1, 0, 1]))",
        );
        assert!(matches!(result, Err(SceneError::SingularTransform { .. })));
    }
}
