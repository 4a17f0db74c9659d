mod element;
mod jacobian;
