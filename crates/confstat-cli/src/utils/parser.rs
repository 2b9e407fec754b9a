use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected three comma separated numbers (e.g., '10,10,10'), got '{0}'.")]
    WrongArity(String),

    #[error("Component '{component}' of '{input}' is not a number.")]
    NotANumber { component: String, input: String },
}

/// Parses `X,Y,Z` into three floats; whitespace around components is ignored.
pub fn parse_triple(input: &str) -> Result<[f64; 3], ParseError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(ParseError::WrongArity(input.to_string()));
    };
    let number = |component: &str| {
        component
            .parse::<f64>()
            .map_err(|_| ParseError::NotANumber {
                component: component.to_string(),
                input: input.to_string(),
            })
    };
    Ok([number(x)?, number(y)?, number(z)?])
}
