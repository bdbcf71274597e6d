use parse_display::Display;

/// Role of a handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Role {
    #[display("response sink")]
    ResponseSink,
    #[display("request context")]
    RequestContext,
    #[display("input")]
    Input,
}

/// Shape of the record a handler takes as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub(crate) type_name: &'static str,
    pub(crate) name: &'static str,
    pub(crate) fields: &'static [&'static str],
}
impl InputShape {
    /// Full Rust type name of the parameter's inner type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
    /// Name the record gives to serde.
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}

/// Declaration of a single handler parameter, produced by `Param::decl`.
#[derive(Clone, Copy)]
pub enum ParamDecl {
    ResponseSink,
    RequestContext,
    Input(fn() -> Result<InputShape, SignatureError>),
}
impl ParamDecl {
    pub fn role(&self) -> Role {
        match self {
            Self::ResponseSink => Role::ResponseSink,
            Self::RequestContext => Role::RequestContext,
            Self::Input(_) => Role::Input,
        }
    }
}

/// Handler function shape that cannot be adapted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("{0} declared more than once")]
    Duplicate(Role),
    #[error("response sink must be the first parameter")]
    ResponseSinkOutOfPlace,
    #[error("request context must come before the input")]
    RequestContextOutOfPlace,
    #[error("input `{type_name}` is not a record (deserializes as {found})")]
    InputNotRecord {
        type_name: &'static str,
        found: &'static str,
    },
}

/// Parameter and return shape of a handler, computed once at registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Descriptor {
    accepts_response_sink: bool,
    accepts_request_context: bool,
    input_shape: Option<InputShape>,
    produces_output: bool,
}

impl Descriptor {
    /// Validates parameter declarations in declaration order.
    ///
    /// Parameters must follow `[response sink] [request context] [input]`,
    /// each at most once.
    pub fn build(params: &[ParamDecl], produces_output: bool) -> Result<Self, SignatureError> {
        let mut d = Descriptor {
            produces_output,
            ..Descriptor::default()
        };
        for p in params {
            match p {
                ParamDecl::ResponseSink => {
                    if d.accepts_response_sink {
                        return Err(SignatureError::Duplicate(Role::ResponseSink));
                    }
                    if d.accepts_request_context || d.input_shape.is_some() {
                        return Err(SignatureError::ResponseSinkOutOfPlace);
                    }
                    d.accepts_response_sink = true;
                }
                ParamDecl::RequestContext => {
                    if d.accepts_request_context {
                        return Err(SignatureError::Duplicate(Role::RequestContext));
                    }
                    if d.input_shape.is_some() {
                        return Err(SignatureError::RequestContextOutOfPlace);
                    }
                    d.accepts_request_context = true;
                }
                ParamDecl::Input(probe) => {
                    if d.input_shape.is_some() {
                        return Err(SignatureError::Duplicate(Role::Input));
                    }
                    d.input_shape = Some(probe()?);
                }
            }
        }
        Ok(d)
    }

    pub fn accepts_response_sink(&self) -> bool {
        self.accepts_response_sink
    }
    pub fn accepts_request_context(&self) -> bool {
        self.accepts_request_context
    }
    pub fn input_shape(&self) -> Option<&InputShape> {
        self.input_shape.as_ref()
    }
    pub fn produces_output(&self) -> bool {
        self.produces_output
    }
    pub fn roles(&self) -> impl Iterator<Item = Role> {
        [
            self.accepts_response_sink.then_some(Role::ResponseSink),
            self.accepts_request_context.then_some(Role::RequestContext),
            self.input_shape.map(|_| Role::Input),
        ]
        .into_iter()
        .flatten()
    }
}
