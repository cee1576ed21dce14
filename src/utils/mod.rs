pub mod jwt;
pub mod security;
pub mod validacion;
pub mod validated_json;
