fn main() {
    klondike_engine::run();
}
