//! A software stand-in for a GL context.
//!
//! `HeadlessContext` implements [`ShaderBackend`] without a GPU so programs,
//! lights and camera uploads can be exercised anywhere. It keeps the GL
//! object model: numbered shader and program objects, deferred deletion of
//! attached or bound objects, one global "current program" slot, and
//! uniform writes that go to the current program by location only.

use std::{cell::RefCell, collections::HashMap, num::NonZeroU32};

use log::trace;

use crate::backend::{ShaderBackend, ShaderKind, UniformValue};

mod front_end;

use front_end::{GlslType, StageInterface};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessShader(NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessProgram(NonZeroU32);

/// Index into the active-uniform table of whichever program is bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadlessLocation(u32);

struct ShaderObject {
    kind: ShaderKind,
    source: String,
    compiled: Option<StageInterface>,
    info_log: String,
    delete_pending: bool,
}

struct UniformSlot {
    name: String,
    ty: GlslType,
    value: UniformValue,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    info_log: String,
    uniforms: Vec<UniformSlot>,
    delete_pending: bool,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    current: Option<u32>,
    ignored_writes: usize,
    program_limit: Option<usize>,
}

impl State {
    fn allocate(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).unwrap_or(NonZeroU32::MIN)
    }

    fn is_attached(&self, shader: u32) -> bool {
        self.programs.values().any(|p| p.attached.contains(&shader))
    }

    /// Frees a program for good and releases shaders waiting on it.
    fn destroy_program(&mut self, id: u32) {
        let Some(program) = self.programs.remove(&id) else { return };
        for shader in program.attached {
            let pending = self.shaders.get(&shader).is_some_and(|s| s.delete_pending);
            if pending && !self.is_attached(shader) {
                self.shaders.remove(&shader);
            }
        }
    }

    fn link(&mut self, id: u32) {
        let attached = match self.programs.get(&id) {
            Some(program) => program.attached.clone(),
            None => return,
        };

        let mut vertex = None;
        let mut fragment = None;
        let mut problems = Vec::new();
        for shader in attached.iter().filter_map(|s| self.shaders.get(s)) {
            match (&shader.compiled, shader.kind) {
                (None, kind) => problems.push(format!("error: linking with uncompiled {kind:?} shader").to_lowercase()),
                (Some(interface), ShaderKind::Vertex) => vertex = Some(interface),
                (Some(interface), ShaderKind::Fragment) => fragment = Some(interface),
            }
        }

        let result = if !problems.is_empty() {
            Err(problems.join("\n"))
        } else {
            match (vertex, fragment) {
                (Some(vertex), Some(fragment)) => front_end::link(vertex, fragment),
                (None, _) => Err("error: program lacks a vertex shader".to_owned()),
                (_, None) => Err("error: program lacks a fragment shader".to_owned()),
            }
        };

        let Some(program) = self.programs.get_mut(&id) else { return };
        match result {
            Ok(active) => {
                program.linked = true;
                program.info_log.clear();
                program.uniforms = active
                    .into_iter()
                    .map(|(name, ty)| UniformSlot {
                        value: ty.zero(),
                        name,
                        ty,
                    })
                    .collect();
            }
            Err(log) => {
                program.linked = false;
                program.info_log = log;
                program.uniforms.clear();
            }
        }
    }
}

/// GL-style context that runs on the CPU. Single-threaded, like the real one.
#[derive(Default)]
pub struct HeadlessContext {
    state: RefCell<State>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a uniform back from `program`, whether or not it is bound.
    /// Accepts the same names as [`ShaderBackend::uniform_location`].
    pub fn uniform_value(&self, program: HeadlessProgram, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let program = state.programs.get(&program.0.get())?;
        let index = find_uniform(program, name)?;
        Some(program.uniforms[index].value)
    }

    /// Names of the active uniforms of `program`, in location order.
    pub fn active_uniforms(&self, program: HeadlessProgram) -> Vec<String> {
        let state = self.state.borrow();
        state
            .programs
            .get(&program.0.get())
            .map(|p| p.uniforms.iter().map(|u| u.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn current_program(&self) -> Option<HeadlessProgram> {
        let state = self.state.borrow();
        state.current.and_then(NonZeroU32::new).map(HeadlessProgram)
    }

    /// Program objects that have not been deleted, or flagged for deletion.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.values().filter(|p| !p.delete_pending).count()
    }

    /// Shader objects that have not been deleted, or flagged for deletion.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.values().filter(|s| !s.delete_pending).count()
    }

    pub fn is_program(&self, program: HeadlessProgram) -> bool {
        self.state.borrow().programs.contains_key(&program.0.get())
    }

    /// Caps the number of program objects, pending deletions included.
    /// `create_program` fails once the cap is reached, like a driver out of
    /// memory. `None` lifts the cap.
    pub fn limit_programs(&self, limit: Option<usize>) {
        self.state.borrow_mut().program_limit = limit;
    }

    /// Uniform writes dropped because of a missing program, location or type
    /// mismatch. A null location is not counted, GL ignores it silently.
    pub fn ignored_writes(&self) -> usize {
        self.state.borrow().ignored_writes
    }
}

fn find_uniform(program: &ProgramObject, name: &str) -> Option<usize> {
    let element = format!("{name}[0]");
    program
        .uniforms
        .iter()
        .position(|u| u.name == name || u.name == element)
}

impl ShaderBackend for HeadlessContext {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type UniformLocation = HeadlessLocation;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.shaders.insert(
            id.get(),
            ShaderObject {
                kind,
                source: String::new(),
                compiled: None,
                info_log: String::new(),
                delete_pending: false,
            },
        );
        trace!("headless: created {kind:?} shader {id}");
        Ok(HeadlessShader(id))
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader.0.get()) {
            object.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        let Some(object) = state.shaders.get_mut(&shader.0.get()) else { return };
        match front_end::compile(object.kind, &object.source) {
            Ok(interface) => {
                object.compiled = Some(interface);
                object.info_log.clear();
            }
            Err(log) => {
                object.compiled = None;
                object.info_log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        let state = self.state.borrow();
        state.shaders.get(&shader.0.get()).is_some_and(|s| s.compiled.is_some())
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        let state = self.state.borrow();
        state
            .shaders
            .get(&shader.0.get())
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        let id = shader.0.get();
        if state.is_attached(id) {
            // Freed once no program holds it any more
            if let Some(object) = state.shaders.get_mut(&id) {
                object.delete_pending = true;
            }
        } else {
            state.shaders.remove(&id);
        }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut state = self.state.borrow_mut();
        if let Some(limit) = state.program_limit.filter(|&limit| state.programs.len() >= limit) {
            return Err(format!("GL_OUT_OF_MEMORY: program object limit of {limit} reached"));
        }
        let id = state.allocate();
        state.programs.insert(id.get(), ProgramObject::default());
        trace!("headless: created program {id}");
        Ok(HeadlessProgram(id))
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader.0.get()) {
            return;
        }
        if let Some(object) = state.programs.get_mut(&program.0.get()) {
            if !object.attached.contains(&shader.0.get()) {
                object.attached.push(shader.0.get());
            }
        }
    }

    fn link_program(&self, program: Self::Program) {
        self.state.borrow_mut().link(program.0.get());
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        let state = self.state.borrow();
        state.programs.get(&program.0.get()).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        let state = self.state.borrow();
        state
            .programs
            .get(&program.0.get())
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        let mut state = self.state.borrow_mut();
        let id = program.0.get();
        if state.current == Some(id) {
            // Stays usable until something else is bound
            if let Some(object) = state.programs.get_mut(&id) {
                object.delete_pending = true;
            }
        } else {
            state.destroy_program(id);
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        let mut state = self.state.borrow_mut();
        let next = match program {
            // GL_INVALID_VALUE: the binding stays as it was
            Some(p) if !state.programs.contains_key(&p.0.get()) => return,
            Some(p) => Some(p.0.get()),
            None => None,
        };
        let previous = std::mem::replace(&mut state.current, next);

        if let Some(previous) = previous.filter(|&p| Some(p) != next) {
            if state.programs.get(&previous).is_some_and(|p| p.delete_pending) {
                state.destroy_program(previous);
            }
        }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        let state = self.state.borrow();
        let object = state.programs.get(&program.0.get())?;
        if !object.linked {
            return None;
        }
        find_uniform(object, name).map(|index| HeadlessLocation(index as u32))
    }

    fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: UniformValue) {
        let Some(location) = location else { return };

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let slot = state
            .current
            .and_then(|id| state.programs.get_mut(&id))
            .and_then(|program| program.uniforms.get_mut(location.0 as usize))
            .filter(|slot| slot.ty.accepts(&value));

        match slot {
            Some(slot) => {
                trace!("headless: {} = {value:?}", slot.name);
                slot.value = value;
            }
            None => state.ignored_writes += 1,
        }
    }
}
