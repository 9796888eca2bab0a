pub mod city;
pub mod health;
pub mod news;
