pub mod cliente;
pub mod dashboard;
pub mod documento;
pub mod estado;
pub mod geografia;
pub mod itinerario;
pub mod pago;
pub mod personal;
pub mod solicitud;
pub mod tramite;
pub mod usuario;
