use strum::{AsRefStr, Display, EnumString};

/// A CRUD collection exposed by the backend under `/{resource}`.
///
/// The string form is the URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Entradas,
    Saidas,
    Perdas,
    Inventarios,
    Produtos,
    Fornecedores,
    Empresas,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn path_segments_are_lowercase_plurals() {
        assert_eq!(Resource::Inventarios.as_ref(), "inventarios");
        assert_eq!(Resource::Fornecedores.to_string(), "fornecedores");
        assert_eq!(Resource::from_str("empresas").ok(), Some(Resource::Empresas));
    }
}
