pub mod cancha;
pub mod prestamo;
pub mod producto;
pub mod reserva;
pub mod tarifa;
pub mod tipo_cancha;
pub mod usuario;
