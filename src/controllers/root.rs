pub async fn get_root() -> &'static str {
    "Hello from PuppySense!"
}
