use std::rc::Rc;

use canary_shader::{HeadlessContext, ShaderProgram};

pub const LIT_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aNormal;
layout (location = 2) in vec2 aTexCoords;

out vec3 FragPos;
out vec3 Normal;
out vec2 TexCoords;

uniform mat4 ModelMatrix;
uniform mat4 ViewMatrix;
uniform mat4 ProjectionMatrix;

void main()
{
    FragPos = vec3(ModelMatrix * vec4(aPos, 1.0));
    Normal = mat3(transpose(inverse(ModelMatrix))) * aNormal;
    TexCoords = aTexCoords;
    gl_Position = ProjectionMatrix * ViewMatrix * vec4(FragPos, 1.0);
}
"#;

pub const LIT_FRAGMENT: &str = r#"
#version 330 core
#define MAX_LIGHTS 100

struct Light {
    vec3 LightPosition;
    vec3 LightColor;
    float Intensity;
    int LightType;
    float LightRadius;
    vec3 LightDirection;
    float LightCutOff;
};

in vec3 FragPos;
in vec3 Normal;
in vec2 TexCoords;
out vec4 FragColor;

uniform Light lights[MAX_LIGHTS];
uniform int numLights;
uniform vec3 viewPos;
uniform sampler2D texture_diffuse1;
uniform sampler2D texture_specular1;
uniform sampler2D texture_diffuse2;

void main()
{
    vec3 albedo = mix(texture(texture_diffuse1, TexCoords).rgb, texture(texture_diffuse2, TexCoords).rgb, 0.5);
    float shine = texture(texture_specular1, TexCoords).r;
    vec3 norm = normalize(Normal);
    vec3 viewDir = normalize(viewPos - FragPos);
    vec3 result = vec3(0.0);

    for (int i = 0; i < numLights; ++i) {
        vec3 lightDir = lights[i].LightType == 0
            ? normalize(-lights[i].LightDirection)
            : normalize(lights[i].LightPosition - FragPos);
        float diff = max(dot(norm, lightDir), 0.0);
        float spec = pow(max(dot(viewDir, reflect(-lightDir, norm)), 0.0), 32.0) * shine;
        float theta = dot(lightDir, normalize(-lights[i].LightDirection));
        float cone = lights[i].LightType == 2 && theta < lights[i].LightCutOff ? 0.0 : 1.0;
        float falloff = clamp(1.0 - length(lights[i].LightPosition - FragPos) / lights[i].LightRadius, 0.0, 1.0);
        result += (diff * albedo + spec) * lights[i].LightColor * lights[i].Intensity * cone * falloff;
    }

    FragColor = vec4(result, 1.0);
}
"#;

pub const UNLIT_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;
uniform mat4 ModelMatrix;
uniform mat4 ViewMatrix;
uniform mat4 ProjectionMatrix;

void main()
{
    gl_Position = ProjectionMatrix * ViewMatrix * ModelMatrix * vec4(aPos, 1.0);
}
"#;

pub const UNLIT_FRAGMENT: &str = r#"
#version 330 core
out vec4 FragColor;
uniform vec3 color;

void main()
{
    FragColor = vec4(color, 1.0);
}
"#;

pub fn context() -> Rc<HeadlessContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    Rc::new(HeadlessContext::new())
}

pub fn lit_program(ctx: &Rc<HeadlessContext>) -> ShaderProgram<HeadlessContext> {
    ShaderProgram::try_new(ctx, LIT_VERTEX, LIT_FRAGMENT).unwrap()
}

pub fn unlit_program(ctx: &Rc<HeadlessContext>) -> ShaderProgram<HeadlessContext> {
    ShaderProgram::try_new(ctx, UNLIT_VERTEX, UNLIT_FRAGMENT).unwrap()
}
